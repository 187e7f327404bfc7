//! Movement компоненты: физическое тело, направление взгляда

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Направление взгляда (LEFT = -1, RIGHT = 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Направление по знаку значения (0 → None)
    pub fn from_sign(value: f32) -> Option<Self> {
        if value < 0.0 {
            Some(Facing::Left)
        } else if value > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

/// Физическое тело персонажа
///
/// Velocity интегрируем сами (kinematic), позиция — Transform.translation.
/// Пишут только locomotion (velocity, facing) и physics фаза (grounded, позиция).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Body {
    /// Скорость (m/s)
    pub velocity: Vec3,
    pub facing: Facing,
    /// Результат ground probe последнего кадра
    pub grounded: bool,
    /// Множитель гравитации (1.0 = обычная)
    pub gravity_scale: f32,
    /// Масса (kg), для внешних сил (PointEffector)
    pub mass: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            facing: Facing::Right,
            grounded: false,
            gravity_scale: 1.0,
            mass: 1.0,
        }
    }
}

/// Зеркалирование визуала по X (читает presentation слой)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct SpriteFlip {
    pub flip_x: bool,
}
