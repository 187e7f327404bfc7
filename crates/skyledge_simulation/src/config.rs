//! Конфигурация акторов: валидация + blueprint для spawn
//!
//! Все tunable значения задаются при создании актора и не меняются в runtime.
//! Невалидный конфиг = актор не создаётся (`ConfigError`).

use serde::{Deserialize, Serialize};

use crate::ai::BehaviorConfig;
use crate::combat::DamageRule;
use crate::components::{HealthConfig, Tag};
use crate::components::world::CollisionLayer;
use crate::locomotion::{LocomotionCapabilities, LocomotionConfig};

/// Ошибка конфигурации (фатальна для создания актора)
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be > 0 (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// Валидация конфига на этапе конструирования
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

pub(crate) fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

/// Полное описание актора (data-driven spawn)
///
/// `behavior == None` → актор без AI (игрок).
/// `contact_damage == Some` → актор сам наносит контактный урон (шипы, слизни).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorBlueprint {
    pub locomotion: LocomotionConfig,
    pub capabilities: LocomotionCapabilities,
    pub health: HealthConfig,
    pub behavior: Option<BehaviorConfig>,
    pub contact_damage: Option<DamageRule>,
    pub layer: CollisionLayer,
    pub tags: Vec<Tag>,
    /// Half extents AABB актора
    pub half_extents: [f32; 3],
}

impl Default for ActorBlueprint {
    fn default() -> Self {
        Self {
            locomotion: LocomotionConfig::default(),
            capabilities: LocomotionCapabilities::default(),
            health: HealthConfig::default(),
            behavior: None,
            contact_damage: None,
            layer: CollisionLayer::Default,
            tags: Vec::new(),
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl Validate for ActorBlueprint {
    fn validate(&self) -> Result<(), ConfigError> {
        self.locomotion.validate()?;
        self.health.validate()?;
        if let Some(behavior) = &self.behavior {
            behavior.validate()?;
        }
        if let Some(rule) = &self.contact_damage {
            rule.validate()?;
        }
        for (field, value) in ["half_extents.x", "half_extents.y", "half_extents.z"]
            .into_iter()
            .zip(self.half_extents)
        {
            non_negative(field, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_blueprint_is_valid() {
        assert_eq!(ActorBlueprint::default().validate(), Ok(()));
    }

    #[test]
    fn test_negative_health_rejected() {
        let mut blueprint = ActorBlueprint::default();
        blueprint.health.max = -5.0;
        assert!(matches!(
            blueprint.validate(),
            Err(ConfigError::NotPositive { field: "health.max", .. })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        assert_eq!(
            non_negative("speed", f32::NAN),
            Err(ConfigError::NotFinite { field: "speed" })
        );
    }

    #[test]
    fn test_range_check() {
        assert!(in_range("chance", 0.5, 0.0, 1.0).is_ok());
        assert!(in_range("chance", 1.5, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_blueprint_from_json() {
        let json = r#"{
            "locomotion": { "max_speed": 3.0, "coyote_time": 0.1 },
            "health": { "max": 40.0, "destroy_on_death": false },
            "behavior": { "attack_range": 1.5 },
            "layer": "Enemy",
            "tags": ["Enemy"],
            "half_extents": [0.4, 0.5, 0.4]
        }"#;

        let blueprint: ActorBlueprint = serde_json::from_str(json).expect("valid json");
        assert_eq!(blueprint.locomotion.max_speed, 3.0);
        assert_eq!(blueprint.locomotion.coyote_time, 0.1);
        // Не указанные поля берутся из Default
        assert_eq!(blueprint.locomotion.jump_height, LocomotionConfig::default().jump_height);
        assert_eq!(blueprint.health.max, 40.0);
        assert_eq!(blueprint.layer, CollisionLayer::Enemy);
        assert_eq!(blueprint.behavior.map(|b| b.attack_range), Some(1.5));
        assert!(blueprint.validate().is_ok());
    }
}
