//! Locomotion domain module
//!
//! Один контроллер на все варианты персонажей (capability set вместо
//! копий 2D/3D контроллеров).
//!
//! Frame фаза (Update, FrameSet::Locomotion): команды → ground probe →
//! facing → animator.
//! Physics фаза (FixedUpdate, FixedSet::Integrate): горизонталь + extra gravity.

use bevy::prelude::*;

pub mod controller;
pub mod events;
pub mod systems;


// Re-export основных типов
pub use controller::{
    jump_velocity, move_toward, AxisMapping, JumpExecution, JumpKind, JumpState, Locomotion,
    LocomotionCapabilities, LocomotionConfig,
};
pub use events::{
    AnimParam, AnimSignal, AnimTrigger, AnimationSignal, AudioCue, LocomotionCommand, SoundCue,
};

use crate::{FixedSet, FrameSet};

/// Locomotion Plugin
///
/// Update (FrameSet::Locomotion, chain):
/// 1. react_to_damage / react_to_death — DamageTaken/EntityDied → Hit/Die
/// 2. apply_locomotion_commands
/// 3. update_ground_contact — grounded, landing, таймеры
/// 4. update_facing
/// 5. sync_animator
///
/// FixedUpdate (FixedSet::Integrate):
/// - integrate_locomotion
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LocomotionCommand>()
            .add_event::<AnimationSignal>()
            .add_event::<AudioCue>();

        app.add_systems(
            Update,
            (
                systems::react_to_damage,
                systems::react_to_death,
                systems::apply_locomotion_commands,
                systems::update_ground_contact,
                systems::update_facing,
                systems::sync_animator,
            )
                .chain()
                .in_set(FrameSet::Locomotion),
        );

        app.add_systems(
            FixedUpdate,
            systems::integrate_locomotion.in_set(FixedSet::Integrate),
        );
    }
}
