//! Iteration over live components and entities.
//!
//! Two forms share one implementation:
//!
//! - **Cursors** ([`ComponentCursor`], [`EntityCursor`]) hold no borrow and
//!   take the world on every `next` call. The world may be mutated between
//!   calls; the cursor then yields an unspecified sequence, but every handle
//!   it returns is live at the moment it is returned and no freed storage is
//!   ever read.
//! - **Iterators** ([`ComponentIter`], [`EntityIter`]) wrap a cursor together
//!   with `&World`, so the world cannot change while they are in use.
//!
//! Both are single-pass: once `next` returns `None` it keeps returning `None`.
//!
//! ```
//! use coyote::{TypeDescriptor, World};
//!
//! const APPLE: TypeDescriptor = TypeDescriptor::new(0, 4, "Apple");
//!
//! let mut world = World::new();
//! let apple = world.component_create(&APPLE)?;
//!
//! let found: Vec<_> = world.components_iter_filter(&APPLE).collect();
//! assert_eq!(found, vec![apple]);
//! # Ok::<(), coyote::EcsError>(())
//! ```

use std::{iter::FusedIterator, ops::Range};

use smallvec::SmallVec;

use crate::{
    World,
    component::{ComponentId, TypeDescriptor},
    handle::{ComponentHandle, EntityHandle},
};

/// Detached cursor over live components, pool by pool, ascending slot order.
#[derive(Clone, Debug)]
pub struct ComponentCursor {
    /// Pools to visit, in order.
    pools: SmallVec<[ComponentId; 8]>,
    pool_pos: usize,
    slots: Range<u32>,
    next_slot: u32,
    done: bool,
}

impl ComponentCursor {
    /// Every live component, pools in ascending type id order.
    #[must_use]
    pub fn all(world: &World) -> Self {
        let mut pools: SmallVec<[ComponentId; 8]> = world.pools.keys().copied().collect();
        pools.sort_unstable();
        Self::new(pools, 0..u32::MAX)
    }

    /// Live components of one type.
    #[must_use]
    pub fn filter(descriptor: &TypeDescriptor) -> Self {
        Self::filter_range(descriptor, 0, u32::MAX)
    }

    /// Live components of one type whose slot lies in `[start, end)`.
    #[must_use]
    pub fn filter_range(descriptor: &TypeDescriptor, start: u32, end: u32) -> Self {
        let mut pools = SmallVec::new();
        pools.push(descriptor.id());
        Self::new(pools, start..end)
    }

    fn new(pools: SmallVec<[ComponentId; 8]>, slots: Range<u32>) -> Self {
        Self {
            pools,
            pool_pos: 0,
            next_slot: slots.start,
            slots,
            done: false,
        }
    }

    /// Advance to the next live component, or `None` once exhausted.
    pub fn next(&mut self, world: &World) -> Option<ComponentHandle> {
        if self.done {
            return None;
        }

        while let Some(type_id) = self.pools.get(self.pool_pos) {
            if let Some(pool) = world.pool(*type_id) {
                let len = u32::try_from(pool.len()).unwrap_or(u32::MAX);
                let end = self.slots.end.min(len);
                while self.next_slot < end {
                    let slot = self.next_slot;
                    self.next_slot += 1;
                    if let Some(component) = pool.live_component_at(slot) {
                        return Some(component);
                    }
                }
            }
            self.pool_pos += 1;
            self.next_slot = self.slots.start;
        }

        self.done = true;
        None
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.done
    }
}

/// Detached cursor over live entities, ascending slot order.
#[derive(Clone, Debug)]
pub struct EntityCursor {
    filter: Option<ComponentId>,
    end: u32,
    next_slot: u32,
    done: bool,
}

impl EntityCursor {
    /// Every live entity.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            filter: None,
            end: u32::MAX,
            next_slot: 0,
            done: false,
        }
    }

    /// Live entities holding a component of the descriptor's type.
    #[must_use]
    pub const fn filter(descriptor: &TypeDescriptor) -> Self {
        Self::filter_range(descriptor, 0, u32::MAX)
    }

    /// Like [`EntityCursor::filter`], limited to entity slots in `[start, end)`.
    #[must_use]
    pub const fn filter_range(descriptor: &TypeDescriptor, start: u32, end: u32) -> Self {
        Self {
            filter: Some(descriptor.id()),
            end,
            next_slot: start,
            done: false,
        }
    }

    /// Advance to the next matching live entity, or `None` once exhausted.
    pub fn next(&mut self, world: &World) -> Option<EntityHandle> {
        if self.done {
            return None;
        }

        let len = u32::try_from(world.entities.capacity()).unwrap_or(u32::MAX);
        let end = self.end.min(len);
        while self.next_slot < end {
            let slot = self.next_slot;
            self.next_slot += 1;

            let Some(entity) = world.entities.handle_at(slot) else {
                continue;
            };
            let matches = self.filter.is_none_or(|type_id| {
                world
                    .entities
                    .attachments_at(slot)
                    .iter()
                    .any(|attachment| attachment.type_id == type_id)
            });
            if matches {
                return Some(entity);
            }
        }

        self.done = true;
        None
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.done
    }
}

/// Borrowing iterator over live components.
pub struct ComponentIter<'w> {
    world: &'w World,
    cursor: ComponentCursor,
}

impl Iterator for ComponentIter<'_> {
    type Item = ComponentHandle;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next(self.world)
    }
}

impl FusedIterator for ComponentIter<'_> {}

/// Borrowing iterator over live entities.
pub struct EntityIter<'w> {
    world: &'w World,
    cursor: EntityCursor,
}

impl Iterator for EntityIter<'_> {
    type Item = EntityHandle;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next(self.world)
    }
}

impl FusedIterator for EntityIter<'_> {}

impl World {
    /// Iterate over every live component.
    #[must_use]
    pub fn components_iter(&self) -> ComponentIter<'_> {
        ComponentIter {
            world: self,
            cursor: ComponentCursor::all(self),
        }
    }

    /// Iterate over the live components of one type.
    #[must_use]
    pub fn components_iter_filter(&self, descriptor: &TypeDescriptor) -> ComponentIter<'_> {
        ComponentIter {
            world: self,
            cursor: ComponentCursor::filter(descriptor),
        }
    }

    /// Iterate over the live components of one type stored in slots `[start, end)`.
    ///
    /// Splitting a pool into ranges visits each component exactly once.
    #[must_use]
    pub fn components_iter_filter_range(
        &self,
        descriptor: &TypeDescriptor,
        start: u32,
        end: u32,
    ) -> ComponentIter<'_> {
        ComponentIter {
            world: self,
            cursor: ComponentCursor::filter_range(descriptor, start, end),
        }
    }

    /// Iterate over every live entity.
    #[must_use]
    pub fn entities_iter(&self) -> EntityIter<'_> {
        EntityIter {
            world: self,
            cursor: EntityCursor::all(),
        }
    }

    /// Iterate over live entities holding a component of one type.
    #[must_use]
    pub fn entities_iter_filter(&self, descriptor: &TypeDescriptor) -> EntityIter<'_> {
        EntityIter {
            world: self,
            cursor: EntityCursor::filter(descriptor),
        }
    }

    /// Like [`World::entities_iter_filter`], limited to entity slots `[start, end)`.
    #[must_use]
    pub fn entities_iter_filter_range(
        &self,
        descriptor: &TypeDescriptor,
        start: u32,
        end: u32,
    ) -> EntityIter<'_> {
        EntityIter {
            world: self,
            cursor: EntityCursor::filter_range(descriptor, start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLE: TypeDescriptor = TypeDescriptor::new(0, 4, "Apple");
    const PEAR: TypeDescriptor = TypeDescriptor::new(2, 8, "Pear");
    const PLUM: TypeDescriptor = TypeDescriptor::new(9, 1, "Plum");

    #[test]
    fn test_filter_yields_live_in_slot_order() {
        let mut world = World::new();
        let apples: Vec<_> = (0..4)
            .map(|_| world.component_create(&APPLE).unwrap())
            .collect();
        world.component_create(&PEAR).unwrap();
        world.component_destroy(apples[1]).unwrap();

        let found: Vec<_> = world.components_iter_filter(&APPLE).collect();
        assert_eq!(found, vec![apples[0], apples[2], apples[3]]);
    }

    #[test]
    fn test_all_walks_pools_by_type_id() {
        let mut world = World::new();
        let pear = world.component_create(&PEAR).unwrap();
        let apple = world.component_create(&APPLE).unwrap();

        let found: Vec<_> = world.components_iter().collect();
        assert_eq!(found, vec![apple, pear]);
    }

    #[test]
    fn test_range_partitions_pool() {
        let mut world = World::new();
        let apples: Vec<_> = (0..10)
            .map(|_| world.component_create(&APPLE).unwrap())
            .collect();

        let mut seen: Vec<_> = world.components_iter_filter_range(&APPLE, 0, 4).collect();
        seen.extend(world.components_iter_filter_range(&APPLE, 4, 7));
        seen.extend(world.components_iter_filter_range(&APPLE, 7, 100));
        assert_eq!(seen, apples);

        assert_eq!(world.components_iter_filter_range(&APPLE, 5, 5).count(), 0);
        assert_eq!(world.components_iter_filter_range(&APPLE, 8, 3).count(), 0);
    }

    #[test]
    fn test_unknown_type_is_empty() {
        let world = World::new();
        assert_eq!(world.components_iter_filter(&PLUM).next(), None);
        assert_eq!(world.components_iter().next(), None);
        assert_eq!(world.entities_iter().next(), None);
    }

    #[test]
    fn test_cursor_stays_exhausted() {
        let mut world = World::new();
        world.component_create(&APPLE).unwrap();

        let mut cursor = ComponentCursor::filter(&APPLE);
        assert!(cursor.next(&world).is_some());
        assert_eq!(cursor.next(&world), None);
        assert!(cursor.is_exhausted());

        // New components do not restart a spent cursor
        world.component_create(&APPLE).unwrap();
        assert_eq!(cursor.next(&world), None);
    }

    #[test]
    fn test_cursor_survives_mutation() {
        let mut world = World::new();
        let apples: Vec<_> = (0..3)
            .map(|_| world.component_create(&APPLE).unwrap())
            .collect();

        let mut cursor = ComponentCursor::filter(&APPLE);
        assert_eq!(cursor.next(&world), Some(apples[0]));

        world.component_destroy(apples[1]).unwrap();
        world.component_destroy(apples[2]).unwrap();
        world.gc();

        while let Some(component) = cursor.next(&world) {
            assert!(world.component_is_alive(component));
        }
    }

    #[test]
    fn test_entities_filter() {
        let mut world = World::new();
        let e1 = world.entity_create().unwrap();
        let e2 = world.entity_create().unwrap();
        let e3 = world.entity_create().unwrap();
        let apple = world.component_create(&APPLE).unwrap();
        let other = world.component_create(&APPLE).unwrap();
        world.attach(e1, apple, &APPLE).unwrap();
        world.attach(e3, other, &APPLE).unwrap();
        world.entity_destroy(e3).unwrap();

        assert_eq!(world.entities_iter().collect::<Vec<_>>(), vec![e1, e2]);
        assert_eq!(world.entities_iter_filter(&APPLE).collect::<Vec<_>>(), vec![e1]);
        assert_eq!(world.entities_iter_filter(&PEAR).count(), 0);
        assert_eq!(world.entities_iter_filter_range(&APPLE, 1, 3).count(), 0);
    }

    #[test]
    fn test_entity_cursor_exhaustion() {
        let mut world = World::new();
        let e = world.entity_create().unwrap();

        let mut cursor = EntityCursor::all();
        assert_eq!(cursor.next(&world), Some(e));
        assert_eq!(cursor.next(&world), None);
        world.entity_create().unwrap();
        assert_eq!(cursor.next(&world), None);
    }
}
