use std::sync::Arc;

use async_trait::async_trait;
use privacy_domain::{
    CloudEvent, DomainError, DomainResult, JsonCodec, StatusData, StatusProducer,
};
use tracing::debug;

use crate::nats::client::JetStreamPublisher;
use crate::nats::subject::keyed_subject;

/// Publishes sanitized simple status events to the private output stream,
/// keyed by the same device id the input arrived with.
pub struct NatsStatusProducer {
    publisher: Arc<dyn JetStreamPublisher>,
    codec: Arc<JsonCodec<CloudEvent<StatusData>>>,
    base_subject: String,
}

impl NatsStatusProducer {
    pub fn new(
        publisher: Arc<dyn JetStreamPublisher>,
        codec: Arc<JsonCodec<CloudEvent<StatusData>>>,
        base_subject: String,
    ) -> Self {
        debug!(base_subject = %base_subject, "initialized status producer");
        Self {
            publisher,
            codec,
            base_subject,
        }
    }
}

#[async_trait]
impl StatusProducer for NatsStatusProducer {
    async fn publish_status(
        &self,
        device_id: &str,
        event: &CloudEvent<StatusData>,
    ) -> DomainResult<()> {
        let payload = self.codec.encode(event)?;
        let subject = keyed_subject(&self.base_subject, device_id);

        debug!(
            subject = %subject,
            payload_size = payload.len(),
            "publishing status event"
        );

        self.publisher
            .publish(subject, payload.into())
            .await
            .map_err(DomainError::PublishError)
    }
}
