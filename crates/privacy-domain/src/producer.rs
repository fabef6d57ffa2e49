use async_trait::async_trait;

use crate::envelope::CloudEvent;
use crate::error::DomainResult;
use crate::signal::VehicleStatusEvent;
use crate::status::StatusData;

/// Emission seam for sanitized simple status events. Implementations must
/// publish under the same device id the event arrived with.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait StatusProducer: Send + Sync {
    async fn publish_status(
        &self,
        device_id: &str,
        event: &CloudEvent<StatusData>,
    ) -> DomainResult<()>;
}

/// Emission seam for sanitized vehicle status events.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VehicleStatusProducer: Send + Sync {
    async fn publish_vehicle_status(
        &self,
        device_id: &str,
        event: &VehicleStatusEvent,
    ) -> DomainResult<()>;
}
