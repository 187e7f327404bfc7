//! Базовые компоненты акторов: Actor, Health

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{non_negative, positive, ConfigError, Validate};

/// Актор (игрок, враг) — живое существо с Health
///
/// Используется как фильтр кандидатов для TargetSensor.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, HealthConfig)]
pub struct Actor;

/// Маркер: управляется внешним input (не AI)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Параметры здоровья (задаются при spawn)
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct HealthConfig {
    pub max: f32,
    /// Удалять entity после смерти
    pub destroy_on_death: bool,
    /// Задержка удаления (секунды), под death animation
    pub destroy_delay: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            destroy_on_death: true,
            destroy_delay: 0.0,
        }
    }
}

impl Validate for HealthConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("health.max", self.max)?;
        non_negative("health.destroy_delay", self.destroy_delay)
    }
}

/// Результат `Health::apply_damage`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Уже мёртв, ничего не изменилось
    Ignored,
    /// Урон прошёл, актор жив
    Damaged { remaining: f32 },
    /// Урон прошёл и убил (переход в dead ровно один раз)
    Killed,
}

/// Здоровье актора
///
/// Инварианты:
/// - 0 ≤ current ≤ max
/// - dead ⇒ current == 0
/// - dead монотонен (false → true, обратно никогда)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    current: f32,
    max: f32,
    dead: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.max))
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Нанести урон. Мёртвым и для NaN/inf — no-op.
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead || !amount.is_finite() {
            return DamageOutcome::Ignored;
        }

        // Отрицательный урон не должен поднимать выше max
        let remaining = (self.current - amount).min(self.max);

        if remaining <= 0.0 {
            self.die();
            DamageOutcome::Killed
        } else {
            self.current = remaining;
            DamageOutcome::Damaged { remaining }
        }
    }

    /// Лечение, clamp к max. Мёртвым — no-op.
    pub fn heal(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        self.current = (self.current + amount.max(0.0)).min(self.max);
        true
    }

    /// Принудительная смерть. Возвращает true только при первом вызове.
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.current = 0.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100.0);
        assert_eq!(health.current(), 100.0);

        assert_eq!(health.apply_damage(30.0), DamageOutcome::Damaged { remaining: 70.0 });
        assert!(health.is_alive());

        assert_eq!(health.apply_damage(100.0), DamageOutcome::Killed);
        assert_eq!(health.current(), 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_death_happens_once() {
        let mut health = Health::new(10.0);
        assert_eq!(health.apply_damage(10.0), DamageOutcome::Killed); // ровно 0 тоже смерть

        // Всё после смерти — no-op
        assert_eq!(health.apply_damage(5.0), DamageOutcome::Ignored);
        assert!(!health.heal(50.0));
        assert!(!health.die());
        assert_eq!(health.current(), 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_health_heal_clamped() {
        let mut health = Health::new(100.0);
        health.apply_damage(50.0);

        assert!(health.heal(30.0));
        assert_eq!(health.current(), 80.0);

        health.heal(100.0);
        assert_eq!(health.current(), 100.0);
    }

    #[test]
    fn test_heal_never_exceeds_max_over_sequences() {
        let mut health = Health::new(50.0);
        let steps = [(true, 7.0), (false, 3.0), (true, 40.0), (false, 12.5), (true, 1.0), (false, 90.0)];

        for (is_heal, amount) in steps {
            if is_heal {
                health.heal(amount);
            } else {
                health.apply_damage(amount);
            }
            assert!(health.current() <= health.max());
            assert!(health.current() >= 0.0);
        }
    }

    #[test]
    fn test_non_finite_damage_ignored() {
        let mut health = Health::new(20.0);

        for amount in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(health.apply_damage(amount), DamageOutcome::Ignored);
            assert_eq!(health.current(), 20.0);
        }
        assert!(health.is_alive());

        health.heal(f32::NAN);
        assert_eq!(health.current(), 20.0);
    }

    #[test]
    fn test_negative_damage_does_not_overheal() {
        let mut health = Health::new(20.0);
        health.apply_damage(-15.0);
        assert_eq!(health.current(), 20.0);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = HealthConfig {
            max: 0.0,
            ..default()
        };
        assert!(Health::from_config(&config).is_err());

        let config = HealthConfig {
            destroy_delay: -1.0,
            ..default()
        };
        assert!(Health::from_config(&config).is_err());
    }
}
