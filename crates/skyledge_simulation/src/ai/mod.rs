//! AI domain module (Behavior Controller)
//!
//! FSM врага: Idle / Patrol / Chase / Attack / Death.
//! Входы: цель (TargetSensor), Action Zones, BehaviorCommand.
//! Выход: LocomotionCommand.

use bevy::prelude::*;

pub mod behavior;
pub mod events;
pub mod systems;
pub mod zones;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod behavior_tests;

// Re-export основных типов
pub use behavior::{
    Behavior, BehaviorConfig, BehaviorState, IdleTimer, StateFilter, TargetDecision, TargetSensor,
};
pub use events::BehaviorCommand;
pub use zones::{ActionZone, ZoneAction, ZoneDirections};

use crate::FrameSet;

/// Behavior Plugin
///
/// Update:
/// - FrameSet::Decide (chain): start_patrol → behavior_on_death →
///   tick_idle_timers → acquire_targets → dispatch_zone_actions → behavior_tick
/// - FrameSet::Command: handle_behavior_commands
pub struct BehaviorPlugin;

impl Plugin for BehaviorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BehaviorCommand>();

        app.add_systems(
            Update,
            (
                systems::start_patrol,
                systems::behavior_on_death,
                systems::tick_idle_timers,
                systems::acquire_targets,
                zones::dispatch_zone_actions,
                systems::behavior_tick,
            )
                .chain()
                .in_set(FrameSet::Decide),
        );

        app.add_systems(
            Update,
            systems::handle_behavior_commands.in_set(FrameSet::Command),
        );
    }
}
