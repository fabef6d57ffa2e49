pub mod envelope;
pub mod error;
pub mod fence;
pub mod fence_service;
pub mod fence_store;
pub mod producer;
pub mod redaction;
pub mod signal;
pub mod status;
pub mod status_service;
pub mod vehicle_status_service;

pub use envelope::{CloudEvent, CodecError, JsonCodec};
pub use error::{DomainError, DomainResult};
pub use fence::{find_containing_cell, generalized_centroid, FenceSet};
pub use fence_service::FenceUpdateService;
pub use fence_store::{FenceStore, InMemoryFenceStore};
pub use producer::{StatusProducer, VehicleStatusProducer};
pub use redaction::{
    redact_status, redact_vehicle_status, LATITUDE_SIGNAL, LONGITUDE_SIGNAL, REDACTED_SIGNAL,
};
pub use signal::{SignalData, SignalValue, StatusV2Data, Vehicle, VehicleStatusEvent};
pub use status::{FenceData, StatusData};
pub use status_service::StatusRedactionService;
pub use vehicle_status_service::VehicleStatusRedactionService;
