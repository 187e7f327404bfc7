//! Locomotion контроллер (один на все варианты: 2D/3D, с аниматором и без)
//!
//! Архитектура:
//! - Горизонталь: clamped move-toward к direction × max_speed (не exponential smoothing)
//! - Вертикаль: baseline gravity в physics фазе + extra gravity здесь
//!   (fall multiplier / low-jump multiplier → variable jump height)
//! - Jump: coyote window → первый прыжок, double-jump window → второй
//!
//! Вся математика — чистые методы компонента, системы только раздают dt и body.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Facing, LayerMask};
use crate::config::{in_range, non_negative, ConfigError, Validate};

/// Ниже этого |target speed| считаем что input отпущен
const INPUT_DEADZONE: f32 = 0.01;

/// Параметры движения (immutable per actor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Максимальная горизонтальная скорость (m/s)
    pub max_speed: f32,
    /// Разгон (m/s²)
    pub acceleration: f32,
    /// Торможение (m/s²)
    pub deceleration: f32,
    /// Множитель разгона в воздухе (0-1)
    pub air_control: f32,
    /// Высота прыжка при удержании кнопки (m)
    pub jump_height: f32,
    /// Множитель гравитации при раннем отпускании прыжка
    pub low_jump_multiplier: f32,
    /// Множитель гравитации при падении
    pub fall_multiplier: f32,
    /// Coyote time (секунды после схода с земли)
    pub coyote_time: f32,
    /// Окно double jump после первого прыжка (секунды)
    pub double_jump_time: f32,
    /// Дистанция ground probe вниз (m)
    pub ground_probe_distance: f32,
    /// Какие слои считаются землёй
    pub ground_filter: LayerMask,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 1.0,
            acceleration: 10.0,
            deceleration: 10.0,
            air_control: 0.5,
            jump_height: 2.0,
            low_jump_multiplier: 2.0,
            fall_multiplier: 2.5,
            coyote_time: 0.2,
            double_jump_time: 0.5,
            ground_probe_distance: 0.1,
            ground_filter: LayerMask::GROUND,
        }
    }
}

impl Validate for LocomotionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("locomotion.max_speed", self.max_speed)?;
        non_negative("locomotion.acceleration", self.acceleration)?;
        non_negative("locomotion.deceleration", self.deceleration)?;
        in_range("locomotion.air_control", self.air_control, 0.0, 1.0)?;
        non_negative("locomotion.jump_height", self.jump_height)?;
        non_negative("locomotion.low_jump_multiplier", self.low_jump_multiplier)?;
        non_negative("locomotion.fall_multiplier", self.fall_multiplier)?;
        non_negative("locomotion.coyote_time", self.coyote_time)?;
        non_negative("locomotion.double_jump_time", self.double_jump_time)?;
        non_negative("locomotion.ground_probe_distance", self.ground_probe_distance)
    }
}

/// Какая мировая ось горизонтальная (Y всегда вверх)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum AxisMapping {
    /// Side-scroller: горизонталь = X
    #[default]
    Side2D,
    /// 3D сцена в профиль: горизонталь = Z
    Depth3D,
}

impl AxisMapping {
    pub fn horizontal_axis(self) -> Vec3 {
        match self {
            AxisMapping::Side2D => Vec3::X,
            AxisMapping::Depth3D => Vec3::Z,
        }
    }

    pub fn horizontal(self, v: Vec3) -> f32 {
        v.dot(self.horizontal_axis())
    }

    pub fn with_horizontal(self, v: Vec3, value: f32) -> Vec3 {
        match self {
            AxisMapping::Side2D => Vec3::new(value, v.y, v.z),
            AxisMapping::Depth3D => Vec3::new(v.x, v.y, value),
        }
    }
}

/// Набор возможностей (composition вместо наследования вариантов)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct LocomotionCapabilities {
    /// Есть аниматор → шлём AnimationSignal
    pub animator: bool,
    /// Есть спрайт → зеркалим SpriteFlip при смене facing
    pub sprite_flip: bool,
    /// Есть источник звука → шлём AudioCue
    pub audio: bool,
    pub axes: AxisMapping,
}

impl Default for LocomotionCapabilities {
    fn default() -> Self {
        Self {
            animator: true,
            sprite_flip: true,
            audio: false,
            axes: AxisMapping::Side2D,
        }
    }
}

/// Состояние прыжка (таймеры никогда не уходят ниже 0)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct JumpState {
    /// Сколько ещё секунд действует coyote window
    pub coyote_timer: f32,
    /// Сколько ещё секунд доступен double jump
    pub double_jump_timer: f32,
    /// Кнопка прыжка отпущена с момента последнего нажатия
    pub jump_released: bool,
}

impl Default for JumpState {
    fn default() -> Self {
        Self {
            coyote_timer: 0.0,
            double_jump_timer: 0.0,
            jump_released: true,
        }
    }
}

/// Какой бюджет потратил прыжок
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    /// С земли или в пределах coyote window
    Grounded,
    /// Второй прыжок в double-jump window
    Double,
}

/// Результат нажатия прыжка
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpExecution {
    pub kind: JumpKind,
    /// Новая вертикальная скорость
    pub velocity: f32,
}

/// Locomotion контроллер
///
/// Владеет горизонтальной скоростью и jump state. Body (velocity, facing)
/// пишут только locomotion системы.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(crate::components::Body, Transform)]
pub struct Locomotion {
    config: LocomotionConfig,
    capabilities: LocomotionCapabilities,
    /// Желаемое направление [-1, 1]
    direction: f32,
    /// Текущая горизонтальная скорость после сглаживания
    current_speed: f32,
    jump: JumpState,
    /// Мёртв: команды игнорируются
    halted: bool,
}

impl Locomotion {
    pub fn new(config: LocomotionConfig, capabilities: LocomotionCapabilities) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            capabilities,
            direction: 0.0,
            current_speed: 0.0,
            jump: JumpState::default(),
            halted: false,
        })
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &LocomotionCapabilities {
        &self.capabilities
    }

    pub fn axes(&self) -> AxisMapping {
        self.capabilities.axes
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn jump_state(&self) -> &JumpState {
        &self.jump
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// SetDirection: желаемое горизонтальное направление
    pub fn set_direction(&mut self, direction: f32) {
        if self.halted || !direction.is_finite() {
            return;
        }
        self.direction = direction.clamp(-1.0, 1.0);
    }

    /// Смерть: обнулить input и больше не принимать команды
    pub fn halt(&mut self) {
        self.direction = 0.0;
        self.halted = true;
    }

    /// Горизонтальный шаг physics фазы. Возвращает новую скорость.
    ///
    /// |Δ| ≤ rate × dt; в воздухе разгон умножается на air_control.
    pub fn step_horizontal(&mut self, grounded: bool, dt: f32) -> f32 {
        let target_speed = self.direction * self.config.max_speed;

        self.current_speed = if target_speed.abs() > INPUT_DEADZONE {
            let rate = if grounded {
                self.config.acceleration
            } else {
                self.config.acceleration * self.config.air_control
            };
            move_toward(self.current_speed, target_speed, rate * dt)
        } else {
            move_toward(self.current_speed, 0.0, self.config.deceleration * dt)
        };

        self.current_speed
    }

    /// Дополнительное вертикальное ускорение (m/s², ≤ 0) поверх baseline gravity
    ///
    /// `gravity` — модуль гравитации с учётом gravity_scale тела.
    pub fn extra_gravity(&self, vertical_velocity: f32, gravity: f32) -> f32 {
        if vertical_velocity < 0.0 {
            -gravity * (self.config.fall_multiplier - 1.0)
        } else if vertical_velocity > 0.0 && self.jump.jump_released {
            -gravity * (self.config.low_jump_multiplier - 1.0)
        } else {
            0.0
        }
    }

    /// Тик таймеров frame фазы (после ground probe)
    pub fn tick_timers(&mut self, grounded: bool, dt: f32) {
        if grounded {
            self.jump.coyote_timer = self.config.coyote_time;
        } else {
            self.jump.coyote_timer = (self.jump.coyote_timer - dt).max(0.0);
        }
        self.jump.double_jump_timer = (self.jump.double_jump_timer - dt).max(0.0);
    }

    /// OnJump: пытается выполнить прыжок
    ///
    /// `gravity` — модуль гравитации (без scale), `gravity_scale` — тела.
    /// None → нет бюджета (нажатие игнорируется).
    pub fn try_jump(&mut self, gravity: f32, gravity_scale: f32) -> Option<JumpExecution> {
        if self.halted {
            return None;
        }

        let kind = if self.jump.coyote_timer > 0.0 {
            // Coyote бюджет тратится целиком, взамен открывается double-jump window
            self.jump.coyote_timer = 0.0;
            self.jump.double_jump_timer = self.config.double_jump_time;
            JumpKind::Grounded
        } else if self.jump.double_jump_timer > 0.0 {
            self.jump.double_jump_timer = 0.0;
            JumpKind::Double
        } else {
            return None;
        };

        self.jump.jump_released = false;

        Some(JumpExecution {
            kind,
            velocity: jump_velocity(gravity, self.config.jump_height, gravity_scale),
        })
    }

    /// OnJumpRelease: включает low-jump multiplier на подъёме
    pub fn release_jump(&mut self) {
        self.jump.jump_released = true;
    }

    /// Новое facing, если input смотрит в другую сторону
    pub fn facing_change(&self, current: Facing) -> Option<Facing> {
        match Facing::from_sign(self.direction) {
            Some(wanted) if wanted != current => Some(wanted),
            _ => None,
        }
    }
}

/// v = sqrt(2 · g · h · scale)
pub fn jump_velocity(gravity: f32, jump_height: f32, gravity_scale: f32) -> f32 {
    (2.0 * gravity.abs() * jump_height * gravity_scale).max(0.0).sqrt()
}

/// Линейный move-toward с ограничением шага
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}
