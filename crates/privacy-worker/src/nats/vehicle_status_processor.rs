use std::sync::Arc;

use anyhow::anyhow;
use privacy_domain::{JsonCodec, VehicleStatusEvent, VehicleStatusRedactionService};
use tracing::{debug, error, warn};

use crate::nats::consumer::{ConsumedMessage, Disposition, MessageProcessor};
use crate::nats::subject::device_id_from_subject;

/// Builds the processor for the vehicle status stream. Same fault policy as
/// the simple status stream: malformed bytes crash the instance, domain
/// failures nak for redelivery.
pub fn create_vehicle_status_processor(
    codec: Arc<JsonCodec<VehicleStatusEvent>>,
    service: Arc<VehicleStatusRedactionService>,
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
                .map_err(|error| anyhow!("vehicle status event on {}: {error}", message.subject))?;

            match service.process_vehicle_status(device_id, event).await {
                Ok(()) => {
                    debug!(device_id = %device_id, "processed vehicle status event");
                    Ok(Disposition::Ack)
                }
                Err(error) => {
                    warn!(
                        device_id = %device_id,
                        error = %error,
                        "failed to process vehicle status event"
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
    use privacy_domain::producer::MockVehicleStatusProducer;
    use privacy_domain::FenceSet;

    fn message(subject: &str, payload: &[u8]) -> ConsumedMessage {
        ConsumedMessage {
            subject: subject.to_owned(),
            payload: Bytes::copy_from_slice(payload),
        }
    }

    #[tokio::test]
    async fn fenced_vehicle_event_is_redacted_and_acked() {
        let mut store = MockFenceStore::new();
        store.expect_get_fence().times(1).return_once(|_| {
            Ok(Some(FenceSet::parse(&[
                "872ab259affffff".to_owned(),
                "872ab259effffff".to_owned(),
            ])))
        });
        let mut producer = MockVehicleStatusProducer::new();
        producer
            .expect_publish_vehicle_status()
            .withf(|device_id, event| {
                let signals = &event.event.data.vehicle.signals;
                device_id == "dev-1" && signals.last().map(|s| s.name.as_str()) == Some("isRedacted")
            })
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = Arc::new(VehicleStatusRedactionService::new(
            Arc::new(store),
            Arc::new(producer),
        ));
        let processor = create_vehicle_status_processor(Arc::new(JsonCodec::new()), service);

        let disposition = processor(message(
            "vehicle_status.dev-1",
            br#"{"id":"evt-2","vehicleTokenId":12345,"data":{"timestamp":1713818407248,"vehicle":{"signals":[{"timestamp":1713818407248,"name":"latitude","value":42.26172693660968},{"timestamp":1713818407248,"name":"longitude","value":-83.71029708818693}]}}}"#,
        ))
        .await
        .unwrap();

        assert_eq!(disposition, Disposition::Ack);
    }

    #[tokio::test]
    async fn malformed_payload_is_fatal() {
        let store = MockFenceStore::new();
        let producer = MockVehicleStatusProducer::new();
        let service = Arc::new(VehicleStatusRedactionService::new(
            Arc::new(store),
            Arc::new(producer),
        ));
        let processor = create_vehicle_status_processor(Arc::new(JsonCodec::new()), service);

        let result = processor(message("vehicle_status.dev-1", b"not json")).await;

        assert!(result.is_err());
    }
}
