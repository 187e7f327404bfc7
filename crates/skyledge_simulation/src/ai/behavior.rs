//! Behavior Controller: FSM врага
//!
//! Patrol → (цель) → Chase ⇄ Attack → (цель потеряна) → Patrol
//! Idle(t) — пауза с таймером, потом Patrol в случайную сторону.
//! Death — терминальное состояние.
//!
//! Состояние гейтит поведение: ветка цели работает только в Patrol/Chase/Attack.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Facing;
use crate::config::{non_negative, ConfigError, Validate};

/// Состояния FSM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum BehaviorState {
    Idle,
    #[default]
    Patrol,
    Chase,
    Attack,
    /// Терминальное
    Death,
}

impl BehaviorState {
    /// Реагирует на цель
    pub fn is_engaged(self) -> bool {
        matches!(self, BehaviorState::Patrol | BehaviorState::Chase | BehaviorState::Attack)
    }
}

/// Требование к состоянию (ActionZone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum StateFilter {
    /// Любое состояние
    #[default]
    Any,
    Only(BehaviorState),
}

impl StateFilter {
    pub fn matches(self, state: BehaviorState) -> bool {
        match self {
            StateFilter::Any => true,
            StateFilter::Only(required) => required == state,
        }
    }
}

/// Параметры поведения
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Дистанция атаки (m)
    pub attack_range: f32,
    /// Минимальный интервал между Attack командами (секунды)
    pub attack_interval: f32,
    /// Направление патруля при spawn
    pub initial_facing: Facing,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            attack_range: 1.0,
            attack_interval: 0.5,
            initial_facing: Facing::Right,
        }
    }
}

impl Validate for BehaviorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("behavior.attack_range", self.attack_range)?;
        non_negative("behavior.attack_interval", self.attack_interval)
    }
}

/// Решение по цели на этот кадр
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetDecision {
    /// SetDirection (-1 или 1)
    pub direction: f32,
    pub attack: bool,
}

/// Behavior Controller
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Behavior {
    config: BehaviorConfig,
    state: BehaviorState,
    target: Option<Entity>,
    /// Секунды до следующей разрешённой атаки
    attack_cooldown: f32,
}

impl Behavior {
    pub fn new(config: BehaviorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: BehaviorState::Patrol,
            target: None,
            attack_cooldown: 0.0,
        })
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn is_dead(&self) -> bool {
        self.state == BehaviorState::Death
    }

    pub fn set_target(&mut self, target: Option<Entity>) {
        if self.is_dead() {
            return;
        }
        self.target = target;
        if target.is_none() {
            self.lose_target();
        }
    }

    /// Цель пропала / умерла → обратно в Patrol
    pub fn lose_target(&mut self) {
        self.target = None;
        if matches!(self.state, BehaviorState::Chase | BehaviorState::Attack) {
            self.state = BehaviorState::Patrol;
        }
    }

    /// Idle(t). false → игнор (Death).
    pub fn enter_idle(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = BehaviorState::Idle;
        true
    }

    /// Idle таймер истёк
    pub fn resume_patrol(&mut self) -> bool {
        if self.state != BehaviorState::Idle {
            return false;
        }
        self.state = BehaviorState::Patrol;
        true
    }

    /// OnDeath. true только при первом вызове.
    pub fn die(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = BehaviorState::Death;
        self.target = None;
        true
    }

    /// Ветка цели
    ///
    /// `offset` — target − self по горизонтальной оси, `distance` — полная дистанция.
    /// None → состояние не реагирует на цель (Idle, Death) или цели нет.
    pub fn decide(&mut self, offset: f32, distance: f32, dt: f32) -> Option<TargetDecision> {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        if self.target.is_none() || !self.state.is_engaged() {
            return None;
        }

        let direction = if offset < 0.0 { -1.0 } else { 1.0 };

        let in_range = distance < self.config.attack_range;
        self.state = if in_range {
            BehaviorState::Attack
        } else {
            BehaviorState::Chase
        };

        let attack = in_range && self.attack_cooldown <= 0.0;
        if attack {
            self.attack_cooldown = self.config.attack_interval;
        }

        Some(TargetDecision { direction, attack })
    }
}

/// Неблокирующая пауза Idle(t)
///
/// Удаляется при смерти, пропадает вместе с entity.
#[derive(Component, Debug, Clone)]
pub struct IdleTimer(pub Timer);

impl IdleTimer {
    pub fn new(duration: f32) -> Self {
        Self(Timer::from_seconds(duration.max(0.0), TimerMode::Once))
    }
}

/// Детектор цели: Interaction Source, чьи Start/End задают цель владельца
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct TargetSensor {
    pub owner: Entity,
}
