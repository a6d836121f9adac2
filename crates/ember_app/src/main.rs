//! # ember_app — demo
//!
//! Builds a small scene, ticks it, and round-trips it through both wire
//! modes:
//!
//! 1. Register component, system, and scene types.
//! 2. Create a `"DemoScene"`, spawn a ship with a thruster child.
//! 3. Run the fixed-timestep tick loop.
//! 4. Encode to binary and text, decode back, and compare structure.

mod components;
mod systems;
mod tick;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ember_codec::Format;
use ember_math::{Transform3D, Vec3};
use ember_scene::{NoAssets, Registries, Scene};

use components::{Health, Velocity};
use systems::{CensusSystem, MovementSystem};
use tick::{TickConfig, run};

fn build_registries() -> Result<Arc<Registries>> {
    let mut registries = Registries::new();

    registries.components_mut().register::<Transform3D>()?;
    registries.components_mut().register::<Velocity>()?;
    registries.components_mut().register::<Health>()?;

    registries.systems_mut().register::<MovementSystem>("MovementSystem")?;
    registries.systems_mut().register::<CensusSystem>("CensusSystem")?;

    registries.scenes_mut().register("DemoScene", |registries| {
        let mut scene = Scene::new(registries);
        scene.add_system_by_name("MovementSystem")?;
        scene.add_system_by_name("CensusSystem")?;
        Ok(scene)
    })?;

    Ok(Arc::new(registries))
}

fn spawn_ship(scene: &mut Scene) -> Result<()> {
    let ship = scene.create_entity_named("ship");
    scene.add_component(ship, Transform3D::from_position(Vec3::ZERO))?;
    scene.add_component(ship, Velocity::new(1.0, 0.0, 0.0))?;
    scene.add_component(ship, Health::full(100.0))?;

    let thruster = scene.create_entity_named("thruster");
    scene.add_component(
        thruster,
        Transform3D::from_position(Vec3::new(0.0, 0.0, 1.0)),
    )?;
    scene.add_child(ship, thruster)?;

    scene.activate_entity(ship)?;
    Ok(())
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ember_app=info".parse()?))
        .init();

    info!("ember demo starting");

    let registries = build_registries()?;
    let mut scene = registries.create_scene("DemoScene")?;

    spawn_ship(&mut scene)?;
    info!(entities = scene.entity_count(), "scene populated");

    run(&mut scene, &TickConfig::default());

    let ship = scene
        .entities()
        .find_first_by_name("ship")
        .ok_or_else(|| anyhow::anyhow!("ship not found after activation"))?;
    let position = scene.component::<Transform3D>(ship.id())?.position;
    let health = scene.component::<Health>(ship.id())?;
    info!(x = position.x, alive = health.is_alive(), "ship state after ticking");

    // Round-trip the scene through both wire modes.
    let binary = scene.to_bytes(Format::Binary)?;
    let text = scene.to_bytes(Format::Text)?;
    info!(
        binary_bytes = binary.len(),
        text_bytes = text.len(),
        "scene encoded"
    );

    let from_binary = Scene::from_bytes(&binary, Format::Binary, &registries, &NoAssets)?;
    let from_text = Scene::from_bytes(&text, Format::Text, &registries, &NoAssets)?;
    anyhow::ensure!(from_binary.entity_count() == scene.entity_count());
    anyhow::ensure!(from_binary.encode()? == from_text.encode()?);
    info!(
        entities = from_binary.entity_count(),
        "both wire modes round-tripped with identical structure"
    );

    info!("ember demo shut down");
    Ok(())
}
