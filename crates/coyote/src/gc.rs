//! Explicit reclamation of destroyed component slots.
//!
//! Destroying a component only marks its slot dead; counts drop right away
//! but the bytes stay in the pool until [`World::gc`] runs. Under
//! [`GcPolicy::Compact`] live records are moved and the component directory
//! is updated, so handles and attachments keep resolving.

use tracing::debug;

use crate::{World, config::GcPolicy};

/// What one [`World::gc`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Pools that had something to reclaim.
    pub pools: usize,
    /// Slots reclaimed over all pools.
    pub reclaimed: usize,
    /// Live records moved to a new slot.
    pub relocated: usize,
    /// Record bytes dropped from the pools.
    pub bytes_released: usize,
}

impl World {
    /// Reclaim the slots of every destroyed component.
    ///
    /// Never invalidates a live handle and never changes
    /// [`World::components_count`].
    pub fn gc(&mut self) -> GcStats {
        let mut stats = GcStats::default();
        let policy = self.config.gc_policy;
        let locations = &mut self.locations;

        for pool in self.pools.values_mut() {
            match policy {
                GcPolicy::Compact => {
                    if pool.dead() == 0 && pool.free() == 0 {
                        continue;
                    }
                    let (reclaimed, relocated, bytes) = pool.compact(|component, slot| {
                        if let Some(Some(location)) = locations.get_mut(component.index() as usize)
                        {
                            location.slot = slot;
                        }
                    });
                    stats.reclaimed += reclaimed;
                    stats.relocated += relocated;
                    stats.bytes_released += bytes;
                }
                GcPolicy::Recycle => {
                    if pool.dead() == 0 {
                        continue;
                    }
                    stats.reclaimed += pool.recycle();
                }
            }
            stats.pools += 1;
        }

        debug!(
            ?policy,
            pools = stats.pools,
            reclaimed = stats.reclaimed,
            relocated = stats.relocated,
            bytes = stats.bytes_released,
            "gc finished"
        );
        stats
    }
}
