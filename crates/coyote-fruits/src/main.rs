//! Fruit basket walkthrough: a world, three entities, three fruit types.
//!
//! Run with `RUST_LOG=trace` to see every handle the engine issues.

use bytemuck::{Pod, Zeroable};
use coyote::{GcPolicy, WorldConfig, prelude::*};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Apple {
    weight: f32,
    bites: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Orange {
    segments: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Pear {
    ripeness: f32,
}

const APPLE: TypeDescriptor = type_descriptor!(0, Apple);
const ORANGE: TypeDescriptor = type_descriptor!(1, Orange);
const PEAR: TypeDescriptor = type_descriptor!(2, Pear);

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("coyote_fruits=info".parse()?)
                .add_directive("coyote=info".parse()?),
        )
        .init();

    let mut universe =
        Universe::new().with_world_config(WorldConfig::new().with_gc_policy(GcPolicy::Compact));
    let handle = universe.create()?;
    info!(world = %handle, "created world");

    let world = universe.world_mut(handle)?;

    let e1 = world.entity_create()?;
    let e2 = world.entity_create()?;
    let e3 = world.entity_create()?;

    let apple = world.component_create(&APPLE)?;
    let orange = world.component_create(&ORANGE)?;
    let pear = world.component_create(&PEAR)?;

    world.component_write(apple, &APPLE, &Apple { weight: 0.2, bites: 0 })?;
    world.component_write(orange, &ORANGE, &Orange { segments: 10 })?;
    world.component_write(pear, &PEAR, &Pear { ripeness: 0.8 })?;

    world.attach(e1, apple, &APPLE)?;
    world.attach(e2, orange, &ORANGE)?;
    info!(%e1, %apple, "apple attached");

    for component in world.components_iter() {
        let ty = world.component_type(component)?;
        info!(%component, ?ty, owner = ?world.component_owner(component)?, "component");
    }

    world.detach(e1, apple)?;
    world.component_destroy(apple)?;
    world.entity_destroy(e1)?;
    world.entity_destroy(e3)?;

    info!(
        entities = world.entities_count(),
        components = world.components_count(),
        "after destroying e1, e3 and the apple"
    );

    let stats = world.gc();
    info!(
        reclaimed = stats.reclaimed,
        relocated = stats.relocated,
        "gc finished"
    );

    let orange_value: Orange = world.component_read(orange, &ORANGE)?;
    info!(segments = orange_value.segments, "orange still attached to e2");

    universe.destroy(handle);
    info!(worlds = universe.len(), "world destroyed");
    Ok(())
}
