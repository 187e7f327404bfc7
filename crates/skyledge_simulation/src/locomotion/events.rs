//! Locomotion events: входящие команды + исходящие сигналы анимации/звука
//!
//! Команды пишут input слой, Behavior контроллер и внешние триггеры.
//! Сигналы — fire-and-forget: presentation слой читает, симуляция не ждёт ответа.

use bevy::prelude::*;

/// Команда для Locomotion контроллера
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum LocomotionCommand {
    /// SetDirection: желаемое горизонтальное направление [-1, 1]
    Move { entity: Entity, direction: f32 },
    /// Нажатие прыжка (edge)
    JumpPressed { entity: Entity },
    /// Отпускание прыжка (edge)
    JumpReleased { entity: Entity },
    Attack { entity: Entity },
    /// Реакция на полученный урон
    Hit { entity: Entity },
    /// Смерть: обнулить движение, death animation
    Die { entity: Entity },
}

impl LocomotionCommand {
    pub fn entity(&self) -> Entity {
        match *self {
            LocomotionCommand::Move { entity, .. }
            | LocomotionCommand::JumpPressed { entity }
            | LocomotionCommand::JumpReleased { entity }
            | LocomotionCommand::Attack { entity }
            | LocomotionCommand::Hit { entity }
            | LocomotionCommand::Die { entity } => entity,
        }
    }
}

/// Триггеры аниматора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTrigger {
    Jump,
    Attack,
    Hit,
    Death,
}

/// Параметры аниматора (обновляются каждый кадр)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimParam {
    InAir(bool),
    Speed(f32),
    VelocityY(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimSignal {
    Trigger(AnimTrigger),
    ResetTrigger(AnimTrigger),
    Param(AnimParam),
}

/// Сигнал аниматору (только для entity с capability `animator`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AnimationSignal {
    pub entity: Entity,
    pub signal: AnimSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Attack,
}

/// Звуковой cue (только для entity с capability `audio`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AudioCue {
    pub entity: Entity,
    pub cue: SoundCue,
}
