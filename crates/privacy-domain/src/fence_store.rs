use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DomainResult;
use crate::fence::FenceSet;

/// Keyed view of the continuously materialized fence table.
///
/// The fence materializer is the sole writer; event drivers only read. A
/// read returns whatever the table holds right now and never waits for a
/// fresher value.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FenceStore: Send + Sync {
    /// Latest fence set for the device, or `None` when no fence is active.
    async fn get_fence(&self, device_id: &str) -> DomainResult<Option<FenceSet>>;

    /// Replaces the device's fence set; last writer wins.
    async fn put_fence(&self, device_id: String, fence: FenceSet) -> DomainResult<()>;

    /// Drops the device's fence set so lookups report no active fence.
    async fn clear_fence(&self, device_id: &str) -> DomainResult<()>;
}

/// In-memory implementation of [`FenceStore`] backed by a read/write-locked
/// map.
pub struct InMemoryFenceStore {
    fences: RwLock<HashMap<String, FenceSet>>,
}

impl InMemoryFenceStore {
    pub fn new() -> Self {
        Self {
            fences: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryFenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FenceStore for InMemoryFenceStore {
    async fn get_fence(&self, device_id: &str) -> DomainResult<Option<FenceSet>> {
        let fences = self.fences.read().await;
        Ok(fences.get(device_id).cloned())
    }

    async fn put_fence(&self, device_id: String, fence: FenceSet) -> DomainResult<()> {
        let mut fences = self.fences.write().await;
        fences.insert(device_id, fence);
        Ok(())
    }

    async fn clear_fence(&self, device_id: &str) -> DomainResult<()> {
        let mut fences = self.fences.write().await;
        fences.remove(device_id);
        Ok(())
    }
}
