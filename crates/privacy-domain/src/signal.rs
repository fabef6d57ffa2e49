use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::CloudEvent;

/// One telemetry reading: a named value sampled at a unix-millisecond
/// timestamp. Readings that belong together share a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalData {
    #[serde(default)]
    pub timestamp: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: SignalValue,
}

/// Closed set of scalar values the vehicle feed produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl Default for SignalValue {
    fn default() -> Self {
        Self::Null
    }
}

impl SignalValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalData>,
}

/// Multi-signal status payload. Unknown `data` fields ride along in
/// `overflow`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusV2Data {
    /// Unix millis at which the payload was sent.
    #[serde(default)]
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Map<String, Value>>,

    #[serde(default)]
    pub vehicle: Vehicle,

    #[serde(flatten)]
    pub overflow: Map<String, Value>,
}

/// Vehicle status event: the shared envelope plus the vehicle identity
/// fields this stream carries at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatusEvent {
    #[serde(flatten)]
    pub event: CloudEvent<StatusV2Data>,

    #[serde(rename = "vehicleTokenId", default)]
    pub token_id: u64,

    #[serde(rename = "userDeviceId", default)]
    pub user_device_id: String,

    #[serde(default)]
    pub make: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub year: i32,
}
