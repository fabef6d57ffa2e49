use std::sync::Arc;

use tracing::{debug, instrument};

use crate::envelope::CloudEvent;
use crate::error::DomainResult;
use crate::fence::FenceSet;
use crate::fence_store::FenceStore;
use crate::status::FenceData;

/// Materializes fence-table events into the keyed fence store.
///
/// This service owns all writes to the store; the status drivers only read.
pub struct FenceUpdateService {
    fence_store: Arc<dyn FenceStore>,
}

impl FenceUpdateService {
    pub fn new(fence_store: Arc<dyn FenceStore>) -> Self {
        Self { fence_store }
    }

    /// Applies the latest fence definition for a device. An event carrying
    /// no usable cell indexes clears the fence so later lookups report no
    /// active fence.
    #[instrument(skip(self, event), fields(device_id = %device_id))]
    pub async fn apply_fence_update(
        &self,
        device_id: &str,
        event: CloudEvent<FenceData>,
    ) -> DomainResult<()> {
        let fence = FenceSet::parse(&event.data.h3_indexes);
        if fence.is_empty() {
            debug!("fence definition has no cells, clearing");
            self.fence_store.clear_fence(device_id).await
        } else {
            debug!(cell_count = fence.len(), "storing fence definition");
            self.fence_store.put_fence(device_id.to_owned(), fence).await
        }
    }
}
