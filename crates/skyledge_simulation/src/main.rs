//! Headless симуляция Skyledge
//!
//! Маленький уровень: земля, игрок, патрулирующий слизень, зоны разворота,
//! шипы. Крутим фиксированное число кадров и печатаем состояние.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use skyledge_simulation::{
    create_headless_app, log_error, log_info, spawn_actor, spawn_hazard, spawn_solid,
    spawn_target_sensor, spawn_zone, ActionZone, ActorBlueprint, Behavior, BehaviorConfig,
    BehaviorState, Body, CollisionLayer, ConfigError, DamageRule, Health, InteractionFilter,
    InteractionKind, LayerMask, StateFilter, Tag, ZoneAction, ZoneDirections,
};

const FRAMES: usize = 600;

fn build_level(world: &mut World) -> Result<(Entity, Entity), ConfigError> {
    let actors = populate(&mut world.commands())?;
    world.flush();
    Ok(actors)
}

fn populate(commands: &mut Commands) -> Result<(Entity, Entity), ConfigError> {
    spawn_solid(
        commands,
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(20.0, 0.5, 1.0),
        CollisionLayer::Ground,
    );

    let player = spawn_actor(
        commands,
        &ActorBlueprint {
            layer: CollisionLayer::Player,
            tags: vec![Tag::Player],
            ..Default::default()
        },
        Vec3::new(-4.0, 0.5, 0.0),
    )?;

    let slime = spawn_actor(
        commands,
        &ActorBlueprint {
            behavior: Some(BehaviorConfig::default()),
            contact_damage: Some(DamageRule {
                amount: 15.0,
                rate: 1.0,
                layers: Some(LayerMask::of(&[CollisionLayer::Player])),
                ..Default::default()
            }),
            layer: CollisionLayer::Enemy,
            tags: vec![Tag::Enemy],
            ..Default::default()
        },
        Vec3::new(3.0, 0.5, 0.0),
    )?;

    spawn_target_sensor(
        commands,
        slime,
        Vec3::new(3.0, 1.0, 1.0),
        InteractionFilter::layers(LayerMask::of(&[CollisionLayer::Player])),
    );

    // Зоны разворота на краях патруля
    let enemies = InteractionFilter::layers(LayerMask::of(&[CollisionLayer::Enemy]));
    for (x, action, directions) in [
        (8.0, ZoneAction::FaceLeft, ZoneDirections::RIGHT),
        (-8.0, ZoneAction::FaceRight, ZoneDirections::LEFT),
    ] {
        let zone = ActionZone::new(action, StateFilter::Only(BehaviorState::Patrol), directions, 1.0)?;
        spawn_zone(
            commands,
            zone,
            Vec3::new(x, 0.5, 0.0),
            Vec3::new(0.5, 1.0, 1.0),
            enemies.clone(),
        )?;
    }

    spawn_hazard(
        commands,
        DamageRule {
            amount: 30.0,
            rate: 1.0,
            tags: Some(vec![Tag::Player]),
            ..Default::default()
        },
        InteractionKind::Trigger,
        Vec3::new(-6.0, 0.25, 0.0),
        Vec3::new(0.5, 0.25, 1.0),
    )?;

    Ok((player, slime))
}

fn main() {
    let seed = 42;
    println!("Starting Skyledge headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));

    let (player, slime) = match build_level(app.world_mut()) {
        Ok(actors) => actors,
        Err(err) => {
            log_error(&format!("Level setup failed: {}", err));
            return;
        }
    };

    for frame in 0..FRAMES {
        app.update();

        if frame % 100 == 0 {
            let world = app.world();
            let player_health = world.get::<Health>(player).map(|h| h.current());
            let slime_state = world.get::<Behavior>(slime).map(|b| b.state());
            let slime_x = world.get::<Transform>(slime).map(|t| t.translation.x);
            let slime_vx = world.get::<Body>(slime).map(|b| b.velocity.x);

            log_info(&format!(
                "Frame {}: player hp {:?}, slime {:?} at x={:?} (vx={:?})",
                frame, player_health, slime_state, slime_x, slime_vx
            ));
        }
    }

    println!("Simulation complete!");
}
