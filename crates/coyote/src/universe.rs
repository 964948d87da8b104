//! Universe - worlds addressed by [`WorldHandle`].
//!
//! For hosts that want to hand out plain integer world ids instead of owning
//! [`World`] values directly. Each world is still fully independent.

use tracing::debug;

use crate::{
    World,
    config::WorldConfig,
    error::EcsResult,
    handle::{Handle, HandleAllocator, WorldHandle},
};

/// Owner of any number of worlds.
#[derive(Default)]
pub struct Universe {
    allocator: HandleAllocator<WorldHandle>,
    /// Indexed by world handle index.
    worlds: Vec<Option<World>>,
    config: WorldConfig,
}

impl Universe {
    /// An empty, unbounded universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A universe holding at most `limit` live worlds.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            allocator: HandleAllocator::with_capacity(0, Some(limit)),
            ..Self::default()
        }
    }

    /// Configuration used by [`Universe::create`].
    #[must_use]
    pub fn with_world_config(mut self, config: WorldConfig) -> Self {
        self.config = config;
        self
    }

    /// Create an empty world with the universe's world configuration.
    pub fn create(&mut self) -> EcsResult<WorldHandle> {
        self.create_with(self.config.clone())
    }

    /// Create an empty world with its own configuration.
    pub fn create_with(&mut self, config: WorldConfig) -> EcsResult<WorldHandle> {
        let handle = self.allocator.allocate()?;
        let index = handle.index() as usize;

        if index >= self.worlds.len() {
            self.worlds.resize_with(index + 1, || None);
        }
        self.worlds[index] = Some(World::with_config(config));

        debug!(world = %handle, "world created");
        Ok(handle)
    }

    /// Destroy a world and everything in it.
    ///
    /// Returns `false`, doing nothing, if the handle is not a live world.
    pub fn destroy(&mut self, handle: WorldHandle) -> bool {
        if !self.allocator.deallocate(handle) {
            return false;
        }

        let world = self.worlds[handle.index() as usize].take();
        if let Some(world) = &world {
            debug!(
                world = %handle,
                entities = world.entities_count(),
                components = world.components_count(),
                "world destroyed"
            );
        }
        true
    }

    /// Check if `handle` names a live world.
    #[must_use]
    pub fn contains(&self, handle: WorldHandle) -> bool {
        self.allocator.is_alive(handle)
    }

    /// Borrow a live world.
    pub fn world(&self, handle: WorldHandle) -> EcsResult<&World> {
        self.allocator.check(handle)?;
        self.worlds
            .get(handle.index() as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| handle.invalid())
    }

    /// Mutably borrow a live world.
    pub fn world_mut(&mut self, handle: WorldHandle) -> EcsResult<&mut World> {
        self.allocator.check(handle)?;
        self.worlds
            .get_mut(handle.index() as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| handle.invalid())
    }

    /// Live entities in the world behind `handle`.
    pub fn entities_count(&self, handle: WorldHandle) -> EcsResult<usize> {
        self.world(handle).map(World::entities_count)
    }

    /// Live components in the world behind `handle`.
    pub fn components_count(&self, handle: WorldHandle) -> EcsResult<usize> {
        self.world(handle).map(World::components_count)
    }

    /// Number of live worlds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live worlds in handle slot order.
    pub fn iter(&self) -> impl Iterator<Item = (WorldHandle, &World)> + '_ {
        self.worlds.iter().enumerate().filter_map(|(index, world)| {
            let handle = self.allocator.handle_at(u32::try_from(index).ok()?)?;
            Some((handle, world.as_ref()?))
        })
    }
}

impl std::fmt::Debug for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Universe")
            .field("worlds", &self.len())
            .finish()
    }
}
