use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Stream carrying raw device status events
    #[serde(default = "default_status_stream")]
    pub status_stream: String,

    /// Subject pattern for the status consumer filter
    #[serde(default = "default_status_subject")]
    pub status_subject: String,

    /// Durable consumer name for the status stream
    #[serde(default = "default_status_consumer_name")]
    pub status_consumer_name: String,

    /// Stream receiving sanitized status events
    #[serde(default = "default_status_output_stream")]
    pub status_output_stream: String,

    /// Stream carrying raw vehicle status events
    #[serde(default = "default_vehicle_status_stream")]
    pub vehicle_status_stream: String,

    /// Subject pattern for the vehicle status consumer filter
    #[serde(default = "default_vehicle_status_subject")]
    pub vehicle_status_subject: String,

    /// Durable consumer name for the vehicle status stream
    #[serde(default = "default_vehicle_status_consumer_name")]
    pub vehicle_status_consumer_name: String,

    /// Stream receiving sanitized vehicle status events
    #[serde(default = "default_vehicle_status_output_stream")]
    pub vehicle_status_output_stream: String,

    /// Stream carrying privacy fence definitions
    #[serde(default = "default_fence_stream")]
    pub fence_stream: String,

    /// Subject pattern for the fence consumer filter
    #[serde(default = "default_fence_subject")]
    pub fence_subject: String,

    /// Durable consumer name for the fence stream
    #[serde(default = "default_fence_consumer_name")]
    pub fence_consumer_name: String,

    /// Batch size for consumers
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    /// Port answering liveness checks
    #[serde(default = "default_health_port")]
    pub health_port: u16,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_status_stream() -> String {
    "device_status".to_string()
}

fn default_status_subject() -> String {
    "device_status.*".to_string()
}

fn default_status_consumer_name() -> String {
    "privacy-processor".to_string()
}

fn default_status_output_stream() -> String {
    "device_status_private".to_string()
}

fn default_vehicle_status_stream() -> String {
    "vehicle_status".to_string()
}

fn default_vehicle_status_subject() -> String {
    "vehicle_status.*".to_string()
}

fn default_vehicle_status_consumer_name() -> String {
    "privacy-processor-v2".to_string()
}

fn default_vehicle_status_output_stream() -> String {
    "vehicle_status_private".to_string()
}

fn default_fence_stream() -> String {
    "privacy_fences".to_string()
}

fn default_fence_subject() -> String {
    "privacy_fences.*".to_string()
}

fn default_fence_consumer_name() -> String {
    "privacy-processor-fences".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_startup_timeout_secs() -> u64 {
    30
}

fn default_health_port() -> u16 {
    8080
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("PRIVACY"))
            .build()?
            .try_deserialize()
    }
}
