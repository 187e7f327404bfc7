//! Behavior systems (frame фаза)
//!
//! FrameSet::Decide: смерть → idle таймеры → цели (sensor) → зоны → ветка цели
//! FrameSet::Command: BehaviorCommand → LocomotionCommand

use bevy::prelude::*;
use rand::Rng;

use crate::ai::behavior::{Behavior, BehaviorState, IdleTimer, TargetSensor};
use crate::ai::events::BehaviorCommand;
use crate::combat::{Dead, EntityDied, InteractionEvent, InteractionPhase};
use crate::components::{Body, Facing, Health};
use crate::locomotion::{Locomotion, LocomotionCommand};
use crate::DeterministicRng;

/// Система: стартовый Patrol в initial_facing
pub fn start_patrol(
    spawned: Query<(Entity, &Behavior), Added<Behavior>>,
    mut commands: EventWriter<LocomotionCommand>,
) {
    for (entity, behavior) in spawned.iter() {
        if behavior.state() != BehaviorState::Patrol {
            continue;
        }
        commands.write(LocomotionCommand::Move {
            entity,
            direction: behavior.config().initial_facing.sign(),
        });
    }
}

/// Система: EntityDied → Death (терминально), Idle таймер отменяется
pub fn behavior_on_death(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    mut behaviors: Query<&mut Behavior>,
) {
    for event in deaths.read() {
        let Ok(mut behavior) = behaviors.get_mut(event.entity) else {
            continue;
        };
        if behavior.die() {
            if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
                entity_commands.remove::<IdleTimer>();
            }
            crate::logger::log(&format!("Behavior {:?} → Death", event.entity));
        }
    }
}

/// Система: Idle таймеры → Patrol в случайную сторону
pub fn tick_idle_timers(
    mut commands: Commands,
    time: Res<Time>,
    mut rng: ResMut<DeterministicRng>,
    mut idle: Query<(Entity, &mut IdleTimer, &mut Behavior)>,
    mut locomotion: EventWriter<LocomotionCommand>,
) {
    for (entity, mut timer, mut behavior) in idle.iter_mut() {
        if !timer.0.tick(time.delta()).finished() {
            continue;
        }

        commands.entity(entity).remove::<IdleTimer>();

        if behavior.resume_patrol() {
            let direction = if rng.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            locomotion.write(LocomotionCommand::Move { entity, direction });
            crate::logger::log(&format!("Behavior {:?} idle finished → Patrol ({})", entity, direction));
        }
    }
}

/// Система: TargetSensor Start/End → цель владельца
pub fn acquire_targets(
    mut interactions: EventReader<InteractionEvent>,
    sensors: Query<&TargetSensor>,
    mut behaviors: Query<&mut Behavior>,
) {
    for event in interactions.read() {
        let Ok(sensor) = sensors.get(event.source) else {
            continue;
        };
        if event.target == sensor.owner {
            continue;
        }
        let Ok(mut behavior) = behaviors.get_mut(sensor.owner) else {
            continue;
        };

        match event.phase {
            InteractionPhase::Start => behavior.set_target(Some(event.target)),
            InteractionPhase::End if behavior.target() == Some(event.target) => {
                behavior.set_target(None);
            }
            _ => {}
        }
    }
}

/// Система: ветка цели (face target + Attack в радиусе)
///
/// Цель despawned / мертва → Patrol.
pub fn behavior_tick(
    time: Res<Time>,
    mut actors: Query<(Entity, &mut Behavior, &Transform, Option<&Locomotion>)>,
    targets: Query<(&Transform, Option<&Health>)>,
    mut commands: EventWriter<LocomotionCommand>,
) {
    let delta = time.delta_secs();

    for (entity, mut behavior, transform, locomotion) in actors.iter_mut() {
        let Some(target) = behavior.target() else {
            continue;
        };

        let Ok((target_transform, target_health)) = targets.get(target) else {
            behavior.lose_target();
            continue;
        };
        if target_health.is_some_and(|h| h.is_dead()) {
            behavior.lose_target();
            continue;
        }

        let offset_vector = target_transform.translation - transform.translation;
        let offset = locomotion.map_or(offset_vector.x, |l| l.axes().horizontal(offset_vector));

        let Some(decision) = behavior.decide(offset, offset_vector.length(), delta) else {
            continue;
        };

        commands.write(LocomotionCommand::Move {
            entity,
            direction: decision.direction,
        });
        if decision.attack {
            commands.write(LocomotionCommand::Attack { entity });
        }
    }
}

/// Система: BehaviorCommand → locomotion / Idle
///
/// Death и Idle не принимают pass-through команды.
pub fn handle_behavior_commands(
    mut commands: Commands,
    mut events: EventReader<BehaviorCommand>,
    mut rng: ResMut<DeterministicRng>,
    mut actors: Query<(&mut Behavior, Option<&Body>), Without<Dead>>,
    mut locomotion: EventWriter<LocomotionCommand>,
) {
    for event in events.read() {
        let entity = event.entity();
        let Ok((mut behavior, body)) = actors.get_mut(entity) else {
            continue;
        };
        if behavior.is_dead() {
            continue;
        }

        match *event {
            BehaviorCommand::Idle { duration, .. } => {
                if behavior.enter_idle() {
                    commands.entity(entity).insert(IdleTimer::new(duration));
                    locomotion.write(LocomotionCommand::Move {
                        entity,
                        direction: 0.0,
                    });
                    crate::logger::log(&format!("Behavior {:?} → Idle ({}s)", entity, duration));
                }
            }
            BehaviorCommand::SetTarget { target, .. } => {
                behavior.set_target(target);
            }
            _ if behavior.state() == BehaviorState::Idle => {}
            BehaviorCommand::SetDirection { direction, .. } => {
                locomotion.write(LocomotionCommand::Move { entity, direction });
            }
            BehaviorCommand::FlipDirection { .. } => {
                let facing = body.map_or(Facing::Right, |b| b.facing).flipped();
                locomotion.write(LocomotionCommand::Move {
                    entity,
                    direction: facing.sign(),
                });
            }
            BehaviorCommand::RandomDirection { .. } => {
                let current = body.map_or(Facing::Right, |b| b.facing);
                let facing = if rng.rng.gen_bool(0.5) { current.flipped() } else { current };
                locomotion.write(LocomotionCommand::Move {
                    entity,
                    direction: facing.sign(),
                });
            }
            BehaviorCommand::Jump { .. } => {
                locomotion.write(LocomotionCommand::JumpPressed { entity });
            }
        }
    }
}
