//! Point effector: радиальная сила от центра trigger источника
//!
//! force · (1 − inverse_lerp(min_radius, max_radius, dist)) / mass, в m/s².

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::interaction::{InteractionEvent, InteractionPhase};
use crate::components::Body;
use crate::config::{non_negative, ConfigError, Validate};

#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct PointEffector {
    /// До этого радиуса: полная сила
    pub min_radius: f32,
    /// За этим радиусом: ноль
    pub max_radius: f32,
    /// Отрицательная сила = притяжение
    pub force: f32,
}

impl Default for PointEffector {
    fn default() -> Self {
        Self {
            min_radius: 0.0,
            max_radius: 5.0,
            force: 10.0,
        }
    }
}

impl Validate for PointEffector {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("effector.min_radius", self.min_radius)?;
        non_negative("effector.max_radius", self.max_radius)
    }
}

impl PointEffector {
    /// Ускорение для тела в `target` с массой `mass`
    pub fn acceleration(&self, center: Vec3, target: Vec3, mass: f32) -> Vec3 {
        let offset = target - center;
        let distance = offset.length();
        let Some(direction) = offset.try_normalize() else {
            return Vec3::ZERO;
        };

        let falloff = 1.0 - inverse_lerp(self.min_radius, self.max_radius, distance);
        direction * self.force * falloff / mass.max(f32::EPSILON)
    }
}

/// Clamped inverse lerp: 0 при value ≤ a, 1 при value ≥ b
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return if value < a { 0.0 } else { 1.0 };
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Система: Active контакты effector'а толкают тела
pub fn apply_point_effectors(
    time: Res<Time>,
    mut interactions: EventReader<InteractionEvent>,
    effectors: Query<(&PointEffector, &Transform)>,
    mut bodies: Query<(&mut Body, &Transform), Without<PointEffector>>,
) {
    let delta = time.delta_secs();

    for event in interactions.read() {
        if event.phase != InteractionPhase::Active {
            continue;
        }
        let Ok((effector, center)) = effectors.get(event.source) else {
            continue;
        };
        let Ok((mut body, transform)) = bodies.get_mut(event.target) else {
            continue;
        };

        let acceleration = effector.acceleration(center.translation, transform.translation, body.mass);
        body.velocity += acceleration * delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_lerp() {
        assert_eq!(inverse_lerp(1.0, 3.0, 0.0), 0.0);
        assert_eq!(inverse_lerp(1.0, 3.0, 2.0), 0.5);
        assert_eq!(inverse_lerp(1.0, 3.0, 10.0), 1.0);
    }

    #[test]
    fn test_falloff_and_mass() {
        let effector = PointEffector {
            min_radius: 0.0,
            max_radius: 4.0,
            force: 8.0,
        };

        let near = effector.acceleration(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 1.0);
        assert!((near.x - 6.0).abs() < 1e-5, "near = {:?}", near);

        let heavy = effector.acceleration(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 2.0);
        assert!((heavy.x - 3.0).abs() < 1e-5);

        let far = effector.acceleration(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), 1.0);
        assert_eq!(far, Vec3::ZERO);
    }

    #[test]
    fn test_center_has_no_direction() {
        let effector = PointEffector::default();
        assert_eq!(effector.acceleration(Vec3::ONE, Vec3::ONE, 1.0), Vec3::ZERO);
    }
}
