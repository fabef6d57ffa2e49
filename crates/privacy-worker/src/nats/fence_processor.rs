use std::sync::Arc;

use anyhow::anyhow;
use privacy_domain::{CloudEvent, FenceData, FenceUpdateService, JsonCodec};
use tracing::{debug, error, warn};

use crate::nats::consumer::{ConsumedMessage, Disposition, MessageProcessor};
use crate::nats::subject::device_id_from_subject;

/// Builds the processor that materializes the fence table. A malformed
/// fence definition is as fatal as a malformed status event: a fence that
/// silently fails to apply would leave locations unredacted.
pub fn create_fence_processor(
    codec: Arc<JsonCodec<CloudEvent<FenceData>>>,
    service: Arc<FenceUpdateService>,
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
                .map_err(|error| anyhow!("fence event on {}: {error}", message.subject))?;

            match service.apply_fence_update(device_id, event).await {
                Ok(()) => {
                    debug!(device_id = %device_id, "applied fence update");
                    Ok(Disposition::Ack)
                }
                Err(error) => {
                    warn!(
                        device_id = %device_id,
                        error = %error,
                        "failed to apply fence update"
                    );
                    Ok(Disposition::Nak(Some(error.to_string())))
                }
            }
        })
    })
}
