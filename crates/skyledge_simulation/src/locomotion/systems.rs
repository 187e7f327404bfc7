//! Locomotion systems
//!
//! Frame фаза (Update, variable dt):
//! - apply_locomotion_commands — Move / Jump / Attack / Hit / Die
//! - update_ground_contact — ground probe, landing, coyote/double-jump таймеры
//! - update_facing — flip facing + SpriteFlip
//! - sync_animator — InAir / Speed / VelocityY
//!
//! Physics фаза (FixedUpdate):
//! - integrate_locomotion — горизонтальный move-toward + extra gravity

use bevy::prelude::*;

use crate::combat::{DamageTaken, Dead, EntityDied};
use crate::components::{Body, SpriteFlip, Volume};
use crate::locomotion::controller::Locomotion;
use crate::locomotion::events::{
    AnimParam, AnimSignal, AnimTrigger, AnimationSignal, AudioCue, LocomotionCommand, SoundCue,
};
use crate::physics::{Gravity, GroundProbe};

/// Тело с такой скоростью вверх не считается стоящим на земле
const RISING_EPSILON: f32 = 0.01;

fn animate(
    signals: &mut EventWriter<AnimationSignal>,
    locomotion: &Locomotion,
    entity: Entity,
    signal: AnimSignal,
) {
    if locomotion.capabilities().animator {
        signals.write(AnimationSignal { entity, signal });
    }
}

/// Система: исполнение LocomotionCommand
///
/// Мёртвые (Dead) принимают только Die.
pub fn apply_locomotion_commands(
    mut commands: EventReader<LocomotionCommand>,
    mut actors: Query<(&mut Locomotion, &mut Body, Has<Dead>)>,
    gravity: Res<Gravity>,
    mut animation: EventWriter<AnimationSignal>,
    mut audio: EventWriter<AudioCue>,
) {
    for command in commands.read() {
        let entity = command.entity();
        let Ok((mut locomotion, mut body, is_dead)) = actors.get_mut(entity) else {
            continue;
        };

        if is_dead && !matches!(command, LocomotionCommand::Die { .. }) {
            continue;
        }

        match *command {
            LocomotionCommand::Move { direction, .. } => {
                locomotion.set_direction(direction);
            }
            LocomotionCommand::JumpPressed { .. } => {
                if let Some(jump) = locomotion.try_jump(gravity.magnitude, body.gravity_scale) {
                    // Горизонталь сохраняем, вертикаль задаём напрямую
                    body.velocity.y = jump.velocity;
                    animate(&mut animation, &locomotion, entity, AnimSignal::Trigger(AnimTrigger::Jump));
                }
            }
            LocomotionCommand::JumpReleased { .. } => {
                locomotion.release_jump();
            }
            LocomotionCommand::Attack { .. } => {
                if locomotion.capabilities().audio {
                    audio.write(AudioCue {
                        entity,
                        cue: SoundCue::Attack,
                    });
                }
                animate(&mut animation, &locomotion, entity, AnimSignal::Trigger(AnimTrigger::Attack));
            }
            LocomotionCommand::Hit { .. } => {
                animate(&mut animation, &locomotion, entity, AnimSignal::Trigger(AnimTrigger::Hit));
            }
            LocomotionCommand::Die { .. } => {
                if !locomotion.is_halted() {
                    locomotion.halt();
                    animate(&mut animation, &locomotion, entity, AnimSignal::Trigger(AnimTrigger::Death));
                }
            }
        }
    }
}

/// Система: ground probe + таймеры прыжка
///
/// Тело, летящее вверх, не grounded (иначе сразу после прыжка probe
/// вернёт coyote window и даст третий прыжок).
pub fn update_ground_contact(
    probe: GroundProbe,
    time: Res<Time>,
    mut actors: Query<(Entity, &Transform, Option<&Volume>, &mut Locomotion, &mut Body)>,
    mut animation: EventWriter<AnimationSignal>,
) {
    let delta = time.delta_secs();

    for (entity, transform, volume, mut locomotion, mut body) in actors.iter_mut() {
        let half = volume.map_or(Vec3::ZERO, |v| v.half_extents);
        let config = locomotion.config();

        let touching = probe.is_grounded(
            transform.translation,
            half,
            config.ground_probe_distance,
            config.ground_filter,
        );
        let grounded = touching && body.velocity.y <= RISING_EPSILON;

        let was_grounded = body.grounded;
        body.grounded = grounded;

        // Приземление: гасим вертикальный импульс, сбрасываем jump trigger
        if grounded && !was_grounded {
            if body.velocity.y < 0.0 {
                body.velocity.y = 0.0;
            }
            animate(&mut animation, &locomotion, entity, AnimSignal::ResetTrigger(AnimTrigger::Jump));
        }

        locomotion.tick_timers(grounded, delta);
    }
}

/// Система: facing по знаку input
pub fn update_facing(mut actors: Query<(&Locomotion, &mut Body, Option<&mut SpriteFlip>)>) {
    for (locomotion, mut body, sprite) in actors.iter_mut() {
        let Some(facing) = locomotion.facing_change(body.facing) else {
            continue;
        };

        body.facing = facing;

        if locomotion.capabilities().sprite_flip {
            if let Some(mut sprite) = sprite {
                sprite.flip_x = facing == crate::components::Facing::Left;
            }
        }
    }
}

/// Система: параметры аниматора (каждый кадр)
pub fn sync_animator(
    actors: Query<(Entity, &Locomotion, &Body)>,
    mut animation: EventWriter<AnimationSignal>,
) {
    for (entity, locomotion, body) in actors.iter() {
        if !locomotion.capabilities().animator {
            continue;
        }

        for param in [
            AnimParam::InAir(!body.grounded),
            AnimParam::Speed(locomotion.direction().abs()),
            AnimParam::VelocityY(body.velocity.y),
        ] {
            animation.write(AnimationSignal {
                entity,
                signal: AnimSignal::Param(param),
            });
        }
    }
}

/// Система: hit reaction на полученный урон
pub fn react_to_damage(
    mut damage: EventReader<DamageTaken>,
    actors: Query<(), With<Locomotion>>,
    mut commands: EventWriter<LocomotionCommand>,
) {
    for event in damage.read() {
        if actors.contains(event.target) {
            commands.write(LocomotionCommand::Hit { entity: event.target });
        }
    }
}

/// Система: смерть → Die команда
pub fn react_to_death(
    mut deaths: EventReader<EntityDied>,
    actors: Query<(), With<Locomotion>>,
    mut commands: EventWriter<LocomotionCommand>,
) {
    for event in deaths.read() {
        if actors.contains(event.entity) {
            commands.write(LocomotionCommand::Die { entity: event.entity });
        }
    }
}

/// Система (FixedUpdate): горизонтальный шаг + variable jump height
pub fn integrate_locomotion(
    time: Res<Time>,
    gravity: Res<Gravity>,
    mut actors: Query<(&mut Locomotion, &mut Body)>,
) {
    let delta = time.delta_secs();

    for (mut locomotion, mut body) in actors.iter_mut() {
        let axes = locomotion.axes();
        let speed = locomotion.step_horizontal(body.grounded, delta);
        body.velocity = axes.with_horizontal(body.velocity, speed);

        let effective_gravity = gravity.magnitude * body.gravity_scale;
        let extra = locomotion.extra_gravity(body.velocity.y, effective_gravity);
        body.velocity.y += extra * delta;
    }
}
