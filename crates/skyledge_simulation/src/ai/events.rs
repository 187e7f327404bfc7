//! AI Events — команды Behavior контроллеру
//!
//! Пишут Action Zones, TargetSensor и внешние скрипты.
//! Behavior переводит их в LocomotionCommand (pass-through) или в Idle.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum BehaviorCommand {
    /// Пауза на `duration` секунд, потом Patrol в случайную сторону
    Idle { entity: Entity, duration: f32 },
    /// SetDirection (-1 / 1)
    SetDirection { entity: Entity, direction: f32 },
    /// Развернуться
    FlipDirection { entity: Entity },
    /// 50/50: развернуться или нет
    RandomDirection { entity: Entity },
    Jump { entity: Entity },
    /// Внешнее назначение цели (None → сброс)
    SetTarget { entity: Entity, target: Option<Entity> },
}

impl BehaviorCommand {
    pub fn entity(&self) -> Entity {
        match *self {
            BehaviorCommand::Idle { entity, .. }
            | BehaviorCommand::SetDirection { entity, .. }
            | BehaviorCommand::FlipDirection { entity }
            | BehaviorCommand::RandomDirection { entity }
            | BehaviorCommand::Jump { entity }
            | BehaviorCommand::SetTarget { entity, .. } => entity,
        }
    }
}
