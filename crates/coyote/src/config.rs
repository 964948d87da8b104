//! World configuration.

/// How [`World::gc`](crate::World::gc) reclaims destroyed component slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GcPolicy {
    /// Move live records over the holes and shrink the pool.
    #[default]
    Compact,
    /// Put dead slots on the pool's free list; nothing moves.
    Recycle,
}

/// Sizing, limits and GC behaviour of a [`World`](crate::World).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Entity slots reserved up front.
    pub entity_capacity: usize,
    /// Component handles reserved up front; also the initial size of each new pool.
    pub component_capacity: usize,
    /// Most entities alive at once. `None` is unbounded.
    pub max_entities: Option<usize>,
    /// Most components alive at once, over all pools. `None` is unbounded.
    pub max_components: Option<usize>,
    /// How destroyed slots are reclaimed.
    pub gc_policy: GcPolicy,
}

impl WorldConfig {
    /// Default configuration: no reservations, no limits, compacting GC.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `capacity` entities.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Reserve room for `capacity` component handles and records per new pool.
    #[must_use]
    pub fn with_component_capacity(mut self, capacity: usize) -> Self {
        self.component_capacity = capacity;
        self
    }

    /// Cap the number of live entities.
    #[must_use]
    pub fn with_max_entities(mut self, limit: usize) -> Self {
        self.max_entities = Some(limit);
        self
    }

    /// Cap the number of live components over all pools.
    #[must_use]
    pub fn with_max_components(mut self, limit: usize) -> Self {
        self.max_components = Some(limit);
        self
    }

    /// Choose how [`World::gc`](crate::World::gc) reclaims slots.
    #[must_use]
    pub fn with_gc_policy(mut self, policy: GcPolicy) -> Self {
        self.gc_policy = policy;
        self
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_policy_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&GcPolicy::Compact).unwrap(), "\"compact\"");
        assert_eq!(
            serde_json::from_str::<GcPolicy>("\"recycle\"").unwrap(),
            GcPolicy::Recycle
        );
    }

    #[test]
    fn test_config_roundtrip() {
        let config = WorldConfig::new()
            .with_entity_capacity(32)
            .with_max_components(100)
            .with_gc_policy(GcPolicy::Recycle);

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<WorldConfig>(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "max_entities": 8, "gc_policy": "recycle" }"#).unwrap();

        assert_eq!(
            config,
            WorldConfig::new()
                .with_max_entities(8)
                .with_gc_policy(GcPolicy::Recycle)
        );

        let empty: WorldConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, WorldConfig::default());
    }
}
