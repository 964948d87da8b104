//! World - the main container for all ECS data.
//!
//! The World holds the entity table, one storage pool per component type,
//! and the component directory that maps component handles to pool slots.
//! Entities hold component *handles*, never slot indices, so pools are free
//! to move records around during [`World::gc`].

use hashbrown::{HashMap, hash_map::Entry};
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

use crate::{
    component::{ComponentId, TypeDescriptor},
    config::WorldConfig,
    entity::{Attachment, EntityTable},
    error::{EcsError, EcsResult},
    handle::{ComponentHandle, EntityHandle, Handle, HandleAllocator},
    storage::Pool,
};

/// Location of a component within the pool storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentLocation {
    /// The pool holding this component.
    pub type_id: ComponentId,
    /// Slot index within the pool.
    pub slot: u32,
}

/// The ECS world - container for all entities and components.
pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) entities: EntityTable,
    /// Component handle allocator.
    pub(crate) directory: HandleAllocator<ComponentHandle>,
    /// Component locations indexed by component handle index.
    pub(crate) locations: Vec<Option<ComponentLocation>>,
    pub(crate) pools: HashMap<ComponentId, Pool, FxBuildHasher>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            entities: EntityTable::with_capacity(config.entity_capacity, config.max_entities),
            directory: HandleAllocator::with_capacity(
                config.component_capacity,
                config.max_components,
            ),
            locations: Vec::with_capacity(config.component_capacity),
            pools: HashMap::default(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of live entities.
    #[must_use]
    pub fn entities_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of live components, attached or not.
    #[must_use]
    pub fn components_count(&self) -> usize {
        self.directory.alive_count()
    }

    // ==================== Entity Operations ====================

    /// Create an entity with no components.
    pub fn entity_create(&mut self) -> EcsResult<EntityHandle> {
        let entity = self.entities.create()?;
        trace!(%entity, "entity created");
        Ok(entity)
    }

    /// Destroy an entity.
    ///
    /// Its components are detached, not destroyed: they stay alive and can be
    /// attached elsewhere or destroyed separately.
    pub fn entity_destroy(&mut self, entity: EntityHandle) -> EcsResult<()> {
        let detached = self.entities.destroy(entity)?;

        for attachment in &detached {
            if let Some(location) = self.location(attachment.component) {
                if let Some(pool) = self.pools.get_mut(&location.type_id) {
                    pool.set_owner(location.slot, None);
                }
            }
        }

        trace!(%entity, detached = detached.len(), "entity destroyed");
        Ok(())
    }

    /// Check if an entity is alive.
    #[must_use]
    pub fn entity_is_alive(&self, entity: EntityHandle) -> bool {
        self.entities.is_alive(entity)
    }

    /// Components attached to `entity`, sorted by type id.
    pub fn attachments(&self, entity: EntityHandle) -> EcsResult<&[Attachment]> {
        self.entities.attachments(entity)
    }

    /// The component of the descriptor's type attached to `entity`, if any.
    pub fn entity_component(
        &self,
        entity: EntityHandle,
        descriptor: &TypeDescriptor,
    ) -> EcsResult<Option<ComponentHandle>> {
        self.entities.get(entity, descriptor.id())
    }

    /// Attach `component` to `entity`.
    ///
    /// Fails with [`EcsError::TypeMismatch`] if the component was not created
    /// with `descriptor`'s id, and with [`EcsError::AlreadyAttached`] if the
    /// entity already holds a component of that type or the component is
    /// attached to some entity already.
    pub fn attach(
        &mut self,
        entity: EntityHandle,
        component: ComponentHandle,
        descriptor: &TypeDescriptor,
    ) -> EcsResult<()> {
        self.entities.check(entity)?;
        let location = self.resolve(component)?;

        if location.type_id != descriptor.id() {
            return Err(EcsError::TypeMismatch {
                component,
                expected: descriptor.id(),
                actual: location.type_id,
            });
        }

        if let Some(owner) = self.pool_ref(location.type_id, component)?.owner(location.slot) {
            return Err(EcsError::AlreadyAttached {
                entity: owner,
                type_id: location.type_id,
            });
        }

        self.entities.attach(
            entity,
            Attachment {
                type_id: location.type_id,
                component,
            },
        )?;
        self.pool_mut(location.type_id, component)?
            .set_owner(location.slot, Some(entity));

        trace!(%entity, %component, "component attached");
        Ok(())
    }

    /// Detach `component` from `entity`. The component stays alive.
    pub fn detach(&mut self, entity: EntityHandle, component: ComponentHandle) -> EcsResult<()> {
        self.entities.check(entity)?;
        let location = self.resolve(component)?;

        self.entities.detach(entity, component)?;
        self.pool_mut(location.type_id, component)?
            .set_owner(location.slot, None);

        trace!(%entity, %component, "component detached");
        Ok(())
    }

    // ==================== Component Operations ====================

    /// Create a zero-filled component of the descriptor's type.
    ///
    /// The pool for the type is created on first use. Reusing a type id with
    /// a different size fails with [`EcsError::SizeMismatch`].
    pub fn component_create(&mut self, descriptor: &TypeDescriptor) -> EcsResult<ComponentHandle> {
        if let Some(pool) = self.pools.get(&descriptor.id()) {
            let expected = pool.descriptor().size();
            if expected != descriptor.size() {
                return Err(EcsError::SizeMismatch {
                    type_id: descriptor.id(),
                    expected,
                    actual: descriptor.size(),
                });
            }
        }

        let component = self.directory.allocate()?;
        let pool = match self.pools.entry(descriptor.id()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(
                    type_id = descriptor.id().as_raw(),
                    name = descriptor.name(),
                    size = descriptor.size(),
                    "pool created"
                );
                entry.insert(Pool::with_capacity(
                    *descriptor,
                    self.config.component_capacity,
                ))
            }
        };

        let slot = match pool.allocate(component) {
            Ok(slot) => slot,
            Err(err) => {
                self.directory.deallocate(component);
                return Err(err);
            }
        };

        let index = component.index() as usize;
        if index >= self.locations.len() {
            self.locations.resize(index + 1, None);
        }
        self.locations[index] = Some(ComponentLocation {
            type_id: descriptor.id(),
            slot,
        });

        trace!(%component, name = descriptor.name(), slot, "component created");
        Ok(component)
    }

    /// Destroy a component, detaching it from its entity first.
    ///
    /// The handle is invalid afterwards; destroying it again fails with
    /// [`EcsError::InvalidHandle`]. The slot's bytes are reclaimed by the
    /// next [`World::gc`].
    pub fn component_destroy(&mut self, component: ComponentHandle) -> EcsResult<()> {
        let location = self.resolve(component)?;
        if let Some(owner) = self.pool_ref(location.type_id, component)?.owner(location.slot) {
            self.entities.detach(owner, component)?;
        }
        self.pool_mut(location.type_id, component)?
            .release(location.slot);

        self.directory.deallocate(component);
        self.locations[component.index() as usize] = None;

        trace!(%component, "component destroyed");
        Ok(())
    }

    /// Check if a component is alive.
    #[must_use]
    pub fn component_is_alive(&self, component: ComponentHandle) -> bool {
        self.directory.is_alive(component)
    }

    /// True iff `component` is alive and was created with `descriptor`'s id.
    #[must_use]
    pub fn component_is(&self, component: ComponentHandle, descriptor: &TypeDescriptor) -> bool {
        self.location(component)
            .is_some_and(|location| location.type_id == descriptor.id())
    }

    /// Type id the component was created with.
    pub fn component_type(&self, component: ComponentHandle) -> EcsResult<ComponentId> {
        self.resolve(component).map(|location| location.type_id)
    }

    /// The entity `component` is attached to.
    pub fn component_owner(&self, component: ComponentHandle) -> EcsResult<Option<EntityHandle>> {
        let location = self.resolve(component)?;
        Ok(self.pool_ref(location.type_id, component)?.owner(location.slot))
    }

    /// Where the component's bytes currently live. Changes across [`World::gc`].
    #[must_use]
    pub fn component_location(&self, component: ComponentHandle) -> Option<ComponentLocation> {
        self.location(component)
    }

    /// Raw bytes of a component.
    ///
    /// The engine does not check how the caller reads them; use
    /// [`World::component_is`] or [`World::component_read`] to stay on the
    /// right type.
    pub fn component_get(&self, component: ComponentHandle) -> EcsResult<&[u8]> {
        let location = self.resolve(component)?;
        self.pool_ref(location.type_id, component)?
            .bytes(location.slot)
            .ok_or_else(|| component.invalid())
    }

    /// Mutable raw bytes of a component.
    pub fn component_get_mut(&mut self, component: ComponentHandle) -> EcsResult<&mut [u8]> {
        let location = self.resolve(component)?;
        self.pool_mut(location.type_id, component)?
            .bytes_mut(location.slot)
            .ok_or_else(|| component.invalid())
    }

    /// Copy a component out as `T`, checking type id and size first.
    pub fn component_read<T: bytemuck::Pod>(
        &self,
        component: ComponentHandle,
        descriptor: &TypeDescriptor,
    ) -> EcsResult<T> {
        self.check_layout::<T>(component, descriptor)?;
        let bytes = self.component_get(component)?;
        bytemuck::try_pod_read_unaligned(bytes).map_err(|_| EcsError::LayoutMismatch {
            type_id: descriptor.id(),
            expected: bytes.len(),
            actual: size_of::<T>(),
        })
    }

    /// Overwrite a component with `value`, checking type id and size first.
    pub fn component_write<T: bytemuck::Pod>(
        &mut self,
        component: ComponentHandle,
        descriptor: &TypeDescriptor,
        value: &T,
    ) -> EcsResult<()> {
        self.check_layout::<T>(component, descriptor)?;
        self.component_get_mut(component)?
            .copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }

    // ==================== Pools ====================

    /// The pool storing components of `type_id`.
    #[must_use]
    pub fn pool(&self, type_id: ComponentId) -> Option<&Pool> {
        self.pools.get(&type_id)
    }

    /// All pools, in no particular order.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> + '_ {
        self.pools.values()
    }

    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    // ==================== Internals ====================

    fn location(&self, component: ComponentHandle) -> Option<ComponentLocation> {
        if !self.directory.is_alive(component) {
            return None;
        }
        self.locations
            .get(component.index() as usize)
            .copied()
            .flatten()
    }

    fn resolve(&self, component: ComponentHandle) -> EcsResult<ComponentLocation> {
        self.location(component).ok_or_else(|| component.invalid())
    }

    fn pool_ref(&self, type_id: ComponentId, component: ComponentHandle) -> EcsResult<&Pool> {
        self.pools.get(&type_id).ok_or_else(|| component.invalid())
    }

    fn pool_mut(
        &mut self,
        type_id: ComponentId,
        component: ComponentHandle,
    ) -> EcsResult<&mut Pool> {
        self.pools.get_mut(&type_id).ok_or_else(|| component.invalid())
    }

    fn check_layout<T>(
        &self,
        component: ComponentHandle,
        descriptor: &TypeDescriptor,
    ) -> EcsResult<()> {
        let actual = self.component_type(component)?;
        if actual != descriptor.id() {
            return Err(EcsError::TypeMismatch {
                component,
                expected: descriptor.id(),
                actual,
            });
        }

        let stored = self.pool_ref(actual, component)?.descriptor().size();
        if size_of::<T>() != stored {
            return Err(EcsError::LayoutMismatch {
                type_id: actual,
                expected: stored,
                actual: size_of::<T>(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities_count())
            .field("components", &self.components_count())
            .field("pools", &self.pools.len())
            .finish()
    }
}
