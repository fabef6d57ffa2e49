pub mod nats;
pub mod privacy_worker;

pub use nats::*;
pub use privacy_worker::*;
