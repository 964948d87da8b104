//! Handles with generational indices.
//!
//! Every handle pairs a slot index with a generation counter so slots can be
//! recycled while stale handles are still detected. Generations start at 1,
//! which keeps every packed handle non-zero; zero is the "none" value at the
//! bit level.

use std::{fmt, marker::PhantomData};

use crate::error::{EcsError, EcsResult};

/// Generation counter to detect stale handles.
/// Incremented each time a slot is released.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u32);

impl Generation {
    /// Generation of a slot's first occupant.
    pub const FIRST: Self = Self(1);

    /// The following generation, or `None` once the counter is spent.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Get the raw generation value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Slot index plus generation, shared by all handle kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle {
    index: u32,
    generation: Generation,
}

impl RawHandle {
    #[must_use]
    pub const fn new(index: u32, generation: Generation) -> Self {
        Self { index, generation }
    }

    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }

    /// Pack into a single u64. Never zero.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation.0 as u64) << 32) | (self.index as u64)
    }

    /// Unpack from a u64. Zero (and any value with a zero generation) is `None`.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Option<Self> {
        let generation = (bits >> 32) as u32;
        if generation == 0 {
            return None;
        }
        Some(Self {
            index: bits as u32,
            generation: Generation(generation),
        })
    }
}

/// Common interface of the typed handles.
pub trait Handle: Copy + Eq + fmt::Debug + fmt::Display {
    /// Name of the handle space, used in error messages.
    const KIND: &'static str;

    fn from_raw(raw: RawHandle) -> Self;

    fn raw(self) -> RawHandle;

    /// Error for using this handle after it went stale.
    fn invalid(self) -> EcsError {
        EcsError::InvalidHandle {
            kind: Self::KIND,
            bits: self.raw().to_bits(),
        }
    }
}

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(RawHandle);

        impl $name {
            /// Slot index of this handle.
            #[must_use]
            pub const fn index(self) -> u32 {
                self.0.index()
            }

            /// Generation of this handle.
            #[must_use]
            pub const fn generation(self) -> Generation {
                self.0.generation()
            }

            /// Pack into a single non-zero u64.
            #[must_use]
            pub const fn to_bits(self) -> u64 {
                self.0.to_bits()
            }

            /// Unpack from a u64; zero yields `None`.
            #[must_use]
            pub const fn from_bits(bits: u64) -> Option<Self> {
                match RawHandle::from_bits(bits) {
                    Some(raw) => Some(Self(raw)),
                    None => None,
                }
            }
        }

        impl Handle for $name {
            const KIND: &'static str = $kind;

            fn from_raw(raw: RawHandle) -> Self {
                Self(raw)
            }

            fn raw(self) -> RawHandle {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}v{})"), self.0.index, self.0.generation.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}v{}", self.0.index, self.0.generation.0)
            }
        }
    };
}

handle_type!(
    /// Identifies a live entity inside one world.
    EntityHandle,
    "entity",
    "Entity"
);

handle_type!(
    /// Identifies one live component instance inside one world.
    ComponentHandle,
    "component",
    "Component"
);

handle_type!(
    /// Identifies a world inside a [`Universe`](crate::Universe).
    WorldHandle,
    "world",
    "World"
);

#[derive(Clone, Copy, Debug)]
struct SlotState {
    generation: Generation,
    alive: bool,
}

/// Allocator for handles with generation tracking.
///
/// Maintains a free list of recycled slots. A slot whose generation counter
/// is spent is retired instead of going back on the free list.
pub(crate) struct HandleAllocator<H> {
    slots: Vec<SlotState>,
    free_list: Vec<u32>,
    alive_count: usize,
    limit: Option<usize>,
    _marker: PhantomData<fn() -> H>,
}

impl<H: Handle> Default for HandleAllocator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle> HandleAllocator<H> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            alive_count: 0,
            limit: None,
            _marker: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize, limit: Option<usize>) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity / 4),
            alive_count: 0,
            limit,
            _marker: PhantomData,
        }
    }

    /// Allocate a new handle, reusing a released slot when one is available.
    pub fn allocate(&mut self) -> EcsResult<H> {
        if self.limit.is_some_and(|limit| self.alive_count >= limit) {
            return Err(EcsError::ResourceExhausted { resource: H::KIND });
        }

        let raw = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            RawHandle::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len())
                .map_err(|_| EcsError::ResourceExhausted { resource: H::KIND })?;
            self.slots.push(SlotState {
                generation: Generation::FIRST,
                alive: true,
            });
            RawHandle::new(index, Generation::FIRST)
        };

        self.alive_count += 1;
        Ok(H::from_raw(raw))
    }

    /// Release a handle. Returns `false` if it was not alive.
    pub fn deallocate(&mut self, handle: H) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        let index = handle.raw().index();
        let slot = &mut self.slots[index as usize];
        slot.alive = false;
        if let Some(next) = slot.generation.next() {
            slot.generation = next;
            self.free_list.push(index);
        }
        self.alive_count -= 1;
        true
    }

    #[must_use]
    pub fn is_alive(&self, handle: H) -> bool {
        let raw = handle.raw();
        self.slots
            .get(raw.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == raw.generation())
    }

    /// `Ok` if alive, `InvalidHandle` otherwise.
    pub fn check(&self, handle: H) -> EcsResult<()> {
        if self.is_alive(handle) {
            Ok(())
        } else {
            Err(handle.invalid())
        }
    }

    /// The live handle occupying `index`, if any.
    #[must_use]
    pub fn handle_at(&self, index: u32) -> Option<H> {
        let slot = self.slots.get(index as usize)?;
        slot.alive
            .then(|| H::from_raw(RawHandle::new(index, slot.generation)))
    }

    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of slots ever handed out, live or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_allocation() {
        let mut allocator = HandleAllocator::<EntityHandle>::new();

        let e1 = allocator.allocate().unwrap();
        let e2 = allocator.allocate().unwrap();

        assert_eq!(e1.index(), 0);
        assert_eq!(e2.index(), 1);
        assert!(allocator.is_alive(e1));
        assert!(allocator.is_alive(e2));
        assert_eq!(allocator.alive_count(), 2);
    }

    #[test]
    fn test_handle_deallocation() {
        let mut allocator = HandleAllocator::<EntityHandle>::new();

        let e1 = allocator.allocate().unwrap();
        assert!(allocator.deallocate(e1));
        assert!(!allocator.is_alive(e1));
        assert!(!allocator.deallocate(e1));
        assert_eq!(allocator.alive_count(), 0);

        // Reuses the slot with a new generation
        let e2 = allocator.allocate().unwrap();
        assert_eq!(e2.index(), e1.index());
        assert_ne!(e2.generation(), e1.generation());
        assert_ne!(e2, e1);
        assert!(!allocator.is_alive(e1));
    }

    #[test]
    fn test_released_slot_is_not_alive_for_forged_handle() {
        let mut allocator = HandleAllocator::<ComponentHandle>::new();

        let c = allocator.allocate().unwrap();
        allocator.deallocate(c);

        let forged = ComponentHandle::from_raw(RawHandle::new(
            c.index(),
            c.generation().next().unwrap(),
        ));
        assert!(!allocator.is_alive(forged));
        assert_eq!(allocator.handle_at(c.index()), None);
    }

    #[test]
    fn test_spent_generation_retires_slot() {
        let mut allocator = HandleAllocator::<EntityHandle>::new();
        let first = allocator.allocate().unwrap();
        allocator.slots[first.index() as usize].generation = Generation(u32::MAX);
        let last = EntityHandle::from_raw(RawHandle::new(first.index(), Generation(u32::MAX)));

        assert!(allocator.deallocate(last));
        assert!(allocator.free_list.is_empty());
        let fresh = allocator.allocate().unwrap();
        assert_eq!(fresh.index(), 1);
    }

    #[test]
    fn test_limit_exhausts() {
        let mut allocator = HandleAllocator::<WorldHandle>::with_capacity(2, Some(2));
        let w1 = allocator.allocate().unwrap();
        allocator.allocate().unwrap();

        assert_eq!(
            allocator.allocate(),
            Err(EcsError::ResourceExhausted { resource: "world" })
        );

        allocator.deallocate(w1);
        assert!(allocator.allocate().is_ok());
    }

    #[test]
    fn test_bits_roundtrip_and_zero() {
        let handle = EntityHandle::from_raw(RawHandle::new(12345, Generation(678)));
        assert_ne!(handle.to_bits(), 0);
        assert_eq!(EntityHandle::from_bits(handle.to_bits()), Some(handle));
        assert_eq!(EntityHandle::from_bits(0), None);
        assert_eq!(EntityHandle::from_bits(7), None);
    }

    #[test]
    fn test_display() {
        let handle = ComponentHandle::from_raw(RawHandle::new(3, Generation::FIRST));
        assert_eq!(handle.to_string(), "3v1");
        assert_eq!(format!("{handle:?}"), "Component(3v1)");
    }
}
