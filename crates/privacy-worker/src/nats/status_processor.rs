use std::sync::Arc;

use anyhow::anyhow;
use privacy_domain::{CloudEvent, JsonCodec, StatusData, StatusRedactionService};
use tracing::{debug, error, warn};

use crate::nats::consumer::{ConsumedMessage, Disposition, MessageProcessor};
use crate::nats::subject::device_id_from_subject;

/// Builds the processor for the simple status stream.
///
/// Malformed payload bytes are fatal: silently skipping them would mask
/// upstream schema drift on a privacy control, so the instance crashes and
/// resumes from the last committed message after restart.
pub fn create_status_processor(
    codec: Arc<JsonCodec<CloudEvent<StatusData>>>,
    service: Arc<StatusRedactionService>,
) -> MessageProcessor {
    Box::new(move |message: ConsumedMessage| {
        let codec = Arc::clone(&codec);
        let service = Arc::clone(&service);

        Box::pin(async move {
            let Some(device_id) = device_id_from_subject(&message.subject) else {
                error!(subject = %message.subject, "subject carries no device id, skipping");
                return Ok(Disposition::Ack);
            };

            let event = codec
                .decode(&message.payload)
                .map_err(|error| anyhow!("status event on {}: {error}", message.subject))?;

            match service.process_status(device_id, event).await {
                Ok(()) => {
                    debug!(device_id = %device_id, "processed status event");
                    Ok(Disposition::Ack)
                }
                Err(error) => {
                    warn!(
                        device_id = %device_id,
                        error = %error,
                        "failed to process status event"
                    );
                    Ok(Disposition::Nak(Some(error.to_string())))
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use privacy_domain::fence_store::MockFenceStore;
    use privacy_domain::producer::MockStatusProducer;

    fn service(store: MockFenceStore, producer: MockStatusProducer) -> Arc<StatusRedactionService> {
        Arc::new(StatusRedactionService::new(
            Arc::new(store),
            Arc::new(producer),
        ))
    }

    fn message(subject: &str, payload: &[u8]) -> ConsumedMessage {
        ConsumedMessage {
            subject: subject.to_owned(),
            payload: Bytes::copy_from_slice(payload),
        }
    }

    #[tokio::test]
    async fn well_formed_event_is_processed_and_acked() {
        let mut store = MockFenceStore::new();
        store.expect_get_fence().times(1).return_once(|_| Ok(None));
        let mut producer = MockStatusProducer::new();
        producer
            .expect_publish_status()
            .withf(|device_id, _| device_id == "dev-1")
            .times(1)
            .return_once(|_, _| Ok(()));

        let processor = create_status_processor(Arc::new(JsonCodec::new()), service(store, producer));

        let disposition = processor(message(
            "device_status.dev-1",
            br#"{"id":"evt-1","data":{"latitude":42.0,"longitude":-83.0}}"#,
        ))
        .await
        .unwrap();

        assert_eq!(disposition, Disposition::Ack);
    }

    #[tokio::test]
    async fn malformed_payload_is_fatal() {
        let store = MockFenceStore::new();
        let producer = MockStatusProducer::new();

        let processor = create_status_processor(Arc::new(JsonCodec::new()), service(store, producer));

        let result = processor(message("device_status.dev-1", b"{broken")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn subject_without_a_device_id_is_skipped() {
        let store = MockFenceStore::new();
        let producer = MockStatusProducer::new();

        let processor = create_status_processor(Arc::new(JsonCodec::new()), service(store, producer));

        let disposition = processor(message("device_status", b"{broken")).await.unwrap();

        assert_eq!(disposition, Disposition::Ack);
    }

    #[tokio::test]
    async fn processing_failure_naks_for_redelivery() {
        let mut store = MockFenceStore::new();
        store.expect_get_fence().times(1).return_once(|_| {
            Err(privacy_domain::DomainError::StoreError(anyhow!(
                "store poisoned"
            )))
        });
        let producer = MockStatusProducer::new();

        let processor = create_status_processor(Arc::new(JsonCodec::new()), service(store, producer));

        let disposition = processor(message(
            "device_status.dev-1",
            br#"{"id":"evt-1","data":{}}"#,
        ))
        .await
        .unwrap();

        assert!(matches!(disposition, Disposition::Nak(Some(_))));
    }
}
