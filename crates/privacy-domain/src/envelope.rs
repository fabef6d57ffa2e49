use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event wrapper shared by every stream in the pipeline.
///
/// The payload type is fixed by the stream a message arrived on, so each
/// consumer works with one concrete instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent<T> {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub source: String,

    #[serde(rename = "specversion", default)]
    pub spec_version: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    #[serde(rename = "type", default)]
    pub event_type: String,

    pub data: T,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("message serialization failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// JSON codec for one stream's event shape.
///
/// One instance per stream is constructed during wiring and shared by
/// reference, so there is no process-global codec state.
pub struct JsonCodec<T> {
    _payload: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decode)
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::Encode)
    }
}

impl<T> Default for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}
