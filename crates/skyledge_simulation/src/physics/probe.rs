//! Ground probe: короткий cast вниз от тела против Solid геометрии

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{CollisionLayer, LayerMask, PhysicsLayer, Solid, Volume};
use crate::physics::kinematic::{overlaps_horizontally, LANDING_TOLERANCE};

/// Точка контакта с землёй
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    pub entity: Entity,
    pub point: Vec3,
    pub normal: Vec3,
}

/// SystemParam: запросы к статичной геометрии
///
/// Solid без PhysicsLayer считается `CollisionLayer::Ground`.
#[derive(SystemParam)]
pub struct GroundProbe<'w, 's> {
    solids: Query<'w, 's, (Entity, &'static Transform, &'static Volume, Option<&'static PhysicsLayer>), With<Solid>>,
}

impl GroundProbe<'_, '_> {
    /// Все контакты в пределах `distance` под нижней гранью тела
    pub fn cast_down(
        &self,
        origin: Vec3,
        half_extents: Vec3,
        distance: f32,
        filter: LayerMask,
    ) -> Vec<GroundContact> {
        let bottom = origin.y - half_extents.y;
        let mut contacts = Vec::new();

        for (entity, transform, volume, layer) in self.solids.iter() {
            let layer = layer.map_or(CollisionLayer::Ground, |l| l.0);
            if !filter.contains(layer) {
                continue;
            }

            let center = transform.translation;
            if !overlaps_horizontally(origin, half_extents, center, volume.half_extents) {
                continue;
            }

            let top = center.y + volume.half_extents.y;
            let gap = bottom - top;
            if gap >= -LANDING_TOLERANCE && gap <= distance {
                let min = volume.min(center);
                let max = volume.max(center);
                contacts.push(GroundContact {
                    entity,
                    point: Vec3::new(origin.x.clamp(min.x, max.x), top, origin.z.clamp(min.z, max.z)),
                    normal: Vec3::Y,
                });
            }
        }

        contacts
    }

    pub fn is_grounded(&self, origin: Vec3, half_extents: Vec3, distance: f32, filter: LayerMask) -> bool {
        !self.cast_down(origin, half_extents, distance, filter).is_empty()
    }
}
