use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::DomainResult;
use crate::fence_store::FenceStore;
use crate::producer::VehicleStatusProducer;
use crate::redaction::redact_vehicle_status;
use crate::signal::VehicleStatusEvent;

/// Driver for the vehicle status stream: fence lookup, in-place redaction of
/// the matching timestamp group, re-emission under the same device id.
pub struct VehicleStatusRedactionService {
    fence_store: Arc<dyn FenceStore>,
    producer: Arc<dyn VehicleStatusProducer>,
}

impl VehicleStatusRedactionService {
    pub fn new(
        fence_store: Arc<dyn FenceStore>,
        producer: Arc<dyn VehicleStatusProducer>,
    ) -> Self {
        Self {
            fence_store,
            producer,
        }
    }

    #[instrument(skip(self, event), fields(device_id = %device_id))]
    pub async fn process_vehicle_status(
        &self,
        device_id: &str,
        mut event: VehicleStatusEvent,
    ) -> DomainResult<()> {
        match self.fence_store.get_fence(device_id).await? {
            Some(fence) => {
                redact_vehicle_status(&mut event.event.data, &fence);
                debug!(
                    signal_count = event.event.data.vehicle.signals.len(),
                    "applied privacy fence"
                );
            }
            None => {
                debug!("no active fence, passing event through");
            }
        }

        self.producer
            .publish_vehicle_status(device_id, &event)
            .await
    }
}
