use std::sync::Arc;

use tracing::{debug, instrument};

use crate::envelope::CloudEvent;
use crate::error::DomainResult;
use crate::fence_store::FenceStore;
use crate::producer::StatusProducer;
use crate::redaction::redact_status;
use crate::status::StatusData;

/// Driver for the simple status stream: fence lookup, in-place redaction,
/// re-emission under the same device id.
pub struct StatusRedactionService {
    fence_store: Arc<dyn FenceStore>,
    producer: Arc<dyn StatusProducer>,
}

impl StatusRedactionService {
    pub fn new(fence_store: Arc<dyn FenceStore>, producer: Arc<dyn StatusProducer>) -> Self {
        Self {
            fence_store,
            producer,
        }
    }

    #[instrument(skip(self, event), fields(device_id = %device_id))]
    pub async fn process_status(
        &self,
        device_id: &str,
        mut event: CloudEvent<StatusData>,
    ) -> DomainResult<()> {
        match self.fence_store.get_fence(device_id).await? {
            Some(fence) => {
                redact_status(&mut event.data, &fence);
                debug!(
                    redacted = event.data.is_redacted.unwrap_or(false),
                    "applied privacy fence"
                );
            }
            None => {
                debug!("no active fence, passing event through");
            }
        }

        self.producer.publish_status(device_id, &event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::fence::FenceSet;
    use crate::fence_store::MockFenceStore;
    use crate::producer::MockStatusProducer;

    const FENCED_LAT: f64 = 42.26172693660968;
    const FENCED_LNG: f64 = -83.71029708818693;

    fn fence() -> FenceSet {
        FenceSet::parse(&[
            "872ab259affffff".to_owned(),
            "872ab259effffff".to_owned(),
        ])
    }

    fn status_event(latitude: Option<f64>, longitude: Option<f64>) -> CloudEvent<StatusData> {
        CloudEvent {
            id: "evt-1".to_owned(),
            source: "dimo/integration/2lcaMFcCJfiE7POqqqqq".to_owned(),
            spec_version: "1.0".to_owned(),
            subject: "dev-1".to_owned(),
            time: None,
            event_type: "zone.dimo.device.status.update".to_owned(),
            data: StatusData {
                latitude,
                longitude,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn fenced_event_is_redacted_before_publishing() {
        // Arrange
        let mut store = MockFenceStore::new();
        store
            .expect_get_fence()
            .withf(|device_id| device_id == "dev-1")
            .times(1)
            .return_once(|_| Ok(Some(fence())));

        let mut producer = MockStatusProducer::new();
        producer
            .expect_publish_status()
            .withf(|device_id, event| {
                device_id == "dev-1"
                    && event.data.is_redacted == Some(true)
                    && event.data.latitude != Some(FENCED_LAT)
                    && event.data.longitude != Some(FENCED_LNG)
            })
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = StatusRedactionService::new(Arc::new(store), Arc::new(producer));

        // Act
        let result = service
            .process_status("dev-1", status_event(Some(FENCED_LAT), Some(FENCED_LNG)))
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn event_without_a_fence_passes_through_unflagged() {
        // Arrange
        let mut store = MockFenceStore::new();
        store
            .expect_get_fence()
            .times(1)
            .return_once(|_| Ok(None));

        let mut producer = MockStatusProducer::new();
        producer
            .expect_publish_status()
            .withf(|_, event| {
                event.data.latitude == Some(FENCED_LAT)
                    && event.data.longitude == Some(FENCED_LNG)
                    && event.data.is_redacted.is_none()
            })
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = StatusRedactionService::new(Arc::new(store), Arc::new(producer));

        // Act
        let result = service
            .process_status("dev-1", status_event(Some(FENCED_LAT), Some(FENCED_LNG)))
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn event_missing_a_coordinate_is_forwarded_untouched() {
        // Arrange
        let mut store = MockFenceStore::new();
        store
            .expect_get_fence()
            .times(1)
            .return_once(|_| Ok(Some(fence())));

        let mut producer = MockStatusProducer::new();
        producer
            .expect_publish_status()
            .withf(|_, event| {
                event.data.latitude == Some(FENCED_LAT)
                    && event.data.longitude.is_none()
                    && event.data.is_redacted.is_none()
            })
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = StatusRedactionService::new(Arc::new(store), Arc::new(producer));

        // Act
        let result = service
            .process_status("dev-1", status_event(Some(FENCED_LAT), None))
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn publish_failure_propagates() {
        // Arrange
        let mut store = MockFenceStore::new();
        store
            .expect_get_fence()
            .times(1)
            .return_once(|_| Ok(None));

        let mut producer = MockStatusProducer::new();
        producer
            .expect_publish_status()
            .times(1)
            .return_once(|_, _| Err(DomainError::PublishError(anyhow::anyhow!("nats down"))));

        let service = StatusRedactionService::new(Arc::new(store), Arc::new(producer));

        // Act
        let result = service
            .process_status("dev-1", status_event(Some(FENCED_LAT), Some(FENCED_LNG)))
            .await;

        // Assert
        assert!(matches!(result, Err(DomainError::PublishError(_))));
    }
}
