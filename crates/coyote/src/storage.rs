//! Component storage - type-erased byte pools, one per component type.
//!
//! A pool stores the records of a single type in one contiguous byte array
//! with a stride of the descriptor's size, so walking a pool touches memory
//! in order. Slots are never handed out by reference across a mutation: the
//! world resolves component handles to slot indices on every access.

use crate::{
    component::TypeDescriptor,
    error::{EcsError, EcsResult},
    handle::{ComponentHandle, EntityHandle},
};

/// State of one slot in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Holds a live component, optionally attached to an entity.
    Live {
        component: ComponentHandle,
        owner: Option<EntityHandle>,
    },
    /// Destroyed, waiting for the next GC.
    Dead,
    /// Reclaimed by GC and ready for reuse.
    Free,
}

/// Type-erased storage for all components of one type.
pub struct Pool {
    descriptor: TypeDescriptor,
    /// Record bytes, `slots.len() * descriptor.size()` long.
    data: Vec<u8>,
    slots: Vec<Slot>,
    /// Slots destroyed since the last GC.
    dead: Vec<u32>,
    /// Slots reclaimed by GC.
    free: Vec<u32>,
    live: usize,
}

impl Pool {
    /// Create a new empty pool for the given component type.
    #[must_use]
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self::with_capacity(descriptor, 0)
    }

    /// Create a pool with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(descriptor: TypeDescriptor, capacity: usize) -> Self {
        Self {
            descriptor,
            data: Vec::with_capacity(capacity.saturating_mul(descriptor.size())),
            slots: Vec::with_capacity(capacity),
            dead: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Number of slots, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the pool holds no live components.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of live components.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }

    /// Number of destroyed slots awaiting GC.
    #[must_use]
    pub fn dead(&self) -> usize {
        self.dead.len()
    }

    /// Number of reclaimed slots ready for reuse.
    #[must_use]
    pub fn free(&self) -> usize {
        self.free.len()
    }

    /// Bytes currently occupied by records, live or not.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn slot(&self, index: u32) -> Option<&Slot> {
        self.slots.get(index as usize)
    }

    /// The live component in slot `index`, if any.
    #[must_use]
    pub fn live_component_at(&self, index: u32) -> Option<ComponentHandle> {
        match self.slots.get(index as usize)? {
            Slot::Live { component, .. } => Some(*component),
            Slot::Dead | Slot::Free => None,
        }
    }

    /// The entity `index` is attached to.
    #[must_use]
    pub fn owner(&self, index: u32) -> Option<EntityHandle> {
        match self.slots.get(index as usize)? {
            Slot::Live { owner, .. } => *owner,
            Slot::Dead | Slot::Free => None,
        }
    }

    /// Store a new zeroed record for `component` and return its slot.
    ///
    /// Reuses a reclaimed slot when one is available, otherwise appends.
    pub(crate) fn allocate(&mut self, component: ComponentHandle) -> EcsResult<u32> {
        let live = Slot::Live {
            component,
            owner: None,
        };
        let size = self.descriptor.size();

        let index = if let Some(index) = self.free.pop() {
            let start = index as usize * size;
            self.data[start..start + size].fill(0);
            self.slots[index as usize] = live;
            index
        } else {
            let index = u32::try_from(self.slots.len()).map_err(|_| {
                EcsError::ResourceExhausted {
                    resource: "pool slots",
                }
            })?;
            self.data.resize(self.data.len() + size, 0);
            self.slots.push(live);
            index
        };

        self.live += 1;
        Ok(index)
    }

    /// Mark slot `index` dead. The bytes stay in place until GC.
    ///
    /// Returns `false` if the slot held no live component.
    pub(crate) fn release(&mut self, index: u32) -> bool {
        let Some(slot) = self.slots.get_mut(index as usize) else {
            return false;
        };
        if !matches!(slot, Slot::Live { .. }) {
            return false;
        }

        *slot = Slot::Dead;
        self.dead.push(index);
        self.live -= 1;
        true
    }

    pub(crate) fn set_owner(&mut self, index: u32, new_owner: Option<EntityHandle>) {
        if let Some(Slot::Live { owner, .. }) = self.slots.get_mut(index as usize) {
            *owner = new_owner;
        }
    }

    /// Record bytes of a live slot.
    #[must_use]
    pub fn bytes(&self, index: u32) -> Option<&[u8]> {
        self.live_component_at(index)?;
        let start = index as usize * self.descriptor.size();
        self.data.get(start..start + self.descriptor.size())
    }

    /// Mutable record bytes of a live slot.
    #[must_use]
    pub fn bytes_mut(&mut self, index: u32) -> Option<&mut [u8]> {
        self.live_component_at(index)?;
        let start = index as usize * self.descriptor.size();
        self.data.get_mut(start..start + self.descriptor.size())
    }

    /// Drop the dead and free queues and the slots behind them.
    ///
    /// Moves every live record towards the front, preserving order, and
    /// calls `moved` with the new slot of each record that changed place.
    /// Returns `(reclaimed, relocated, bytes_released)`.
    pub(crate) fn compact(
        &mut self,
        mut moved: impl FnMut(ComponentHandle, u32),
    ) -> (usize, usize, usize) {
        let size = self.descriptor.size();
        let before = self.slots.len();
        let mut write = 0usize;
        let mut relocated = 0;

        for read in 0..before {
            let Slot::Live { component, .. } = self.slots[read] else {
                continue;
            };
            if read != write {
                self.data
                    .copy_within(read * size..(read + 1) * size, write * size);
                self.slots[write] = self.slots[read];
                // `write` < `read` <= u32::MAX
                moved(component, write as u32);
                relocated += 1;
            }
            write += 1;
        }

        self.slots.truncate(write);
        self.data.truncate(write * size);
        self.slots.shrink_to_fit();
        self.data.shrink_to_fit();
        self.dead.clear();
        self.free.clear();

        let reclaimed = before - write;
        (reclaimed, relocated, reclaimed * size)
    }

    /// Hand every dead slot to the free list without moving records.
    ///
    /// Returns the number of slots reclaimed.
    pub(crate) fn recycle(&mut self) -> usize {
        let reclaimed = self.dead.len();
        for index in self.dead.drain(..) {
            self.slots[index as usize] = Slot::Free;
            self.free.push(index);
        }
        // Lowest slots are reused first.
        self.free.sort_unstable_by(|a, b| b.cmp(a));
        reclaimed
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("descriptor", &self.descriptor)
            .field("slots", &self.slots.len())
            .field("live", &self.live)
            .field("dead", &self.dead.len())
            .field("free", &self.free.len())
            .finish()
    }
}
