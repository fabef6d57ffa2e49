use std::sync::Arc;

use async_trait::async_trait;
use privacy_domain::{
    DomainError, DomainResult, JsonCodec, VehicleStatusEvent, VehicleStatusProducer,
};
use tracing::debug;

use crate::nats::client::JetStreamPublisher;
use crate::nats::subject::keyed_subject;

/// Publishes sanitized vehicle status events to the private output stream.
pub struct NatsVehicleStatusProducer {
    publisher: Arc<dyn JetStreamPublisher>,
    codec: Arc<JsonCodec<VehicleStatusEvent>>,
    base_subject: String,
}

impl NatsVehicleStatusProducer {
    pub fn new(
        publisher: Arc<dyn JetStreamPublisher>,
        codec: Arc<JsonCodec<VehicleStatusEvent>>,
        base_subject: String,
    ) -> Self {
        debug!(base_subject = %base_subject, "initialized vehicle status producer");
        Self {
            publisher,
            codec,
            base_subject,
        }
    }
}

#[async_trait]
impl VehicleStatusProducer for NatsVehicleStatusProducer {
    async fn publish_vehicle_status(
        &self,
        device_id: &str,
        event: &VehicleStatusEvent,
    ) -> DomainResult<()> {
        let payload = self.codec.encode(event)?;
        let subject = keyed_subject(&self.base_subject, device_id);

        debug!(
            subject = %subject,
            payload_size = payload.len(),
            "publishing vehicle status event"
        );

        self.publisher
            .publish(subject, payload.into())
            .await
            .map_err(DomainError::PublishError)
    }
}
