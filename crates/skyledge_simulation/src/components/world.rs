//! World компоненты: слои коллизий, теги, объёмы, статичная геометрия
//!
//! Слои и теги — типизированные enum, маски собираются на этапе конфигурации
//! (никаких строковых тегов и runtime lookup).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Слой коллизий (один бит в `LayerMask`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum CollisionLayer {
    #[default]
    Default,
    /// Пол, платформы
    Ground,
    Player,
    Enemy,
    /// Шипы, лава, снаряды
    Hazard,
    /// ActionZone, сенсоры
    Zone,
    Pickup,
}

impl CollisionLayer {
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn name(self) -> &'static str {
        match self {
            CollisionLayer::Default => "Default",
            CollisionLayer::Ground => "Ground",
            CollisionLayer::Player => "Player",
            CollisionLayer::Enemy => "Enemy",
            CollisionLayer::Hazard => "Hazard",
            CollisionLayer::Zone => "Zone",
            CollisionLayer::Pickup => "Pickup",
        }
    }
}

/// Битовая маска слоёв
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);
    pub const GROUND: LayerMask = LayerMask(CollisionLayer::Ground.bit());
    pub const ACTORS: LayerMask = LayerMask(CollisionLayer::Player.bit() | CollisionLayer::Enemy.bit());

    pub fn of(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0, |mask, layer| mask | layer.bit()))
    }

    pub const fn contains(self, layer: CollisionLayer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub const fn with(self, layer: CollisionLayer) -> Self {
        Self(self.0 | layer.bit())
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Слой, на котором находится entity
///
/// Отсутствие компонента = `CollisionLayer::Default`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct PhysicsLayer(pub CollisionLayer);

/// Тег (замена строковых тегов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum Tag {
    Player,
    Enemy,
    Hazard,
    Pickup,
    Projectile,
}

/// Набор тегов entity
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Tags(pub Vec<Tag>);

impl Tags {
    pub fn new(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self(tags.into_iter().collect())
    }

    pub fn has(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    pub fn has_any(&self, tags: &[Tag]) -> bool {
        tags.iter().any(|tag| self.has(*tag))
    }
}

/// AABB объём вокруг Transform.translation (half extents)
///
/// Используется kinematic solver'ом, ground probe и overlap детектором.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Volume {
    pub half_extents: Vec3,
}

impl Default for Volume {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(0.4, 0.5, 0.4),
        }
    }
}

impl Volume {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents: half_extents.abs(),
        }
    }

    pub fn min(&self, center: Vec3) -> Vec3 {
        center - self.half_extents
    }

    pub fn max(&self, center: Vec3) -> Vec3 {
        center + self.half_extents
    }

    /// Пересечение двух AABB (касание граней не считается)
    pub fn overlaps(&self, center: Vec3, other: &Volume, other_center: Vec3) -> bool {
        let delta = (center - other_center).abs();
        let reach = self.half_extents + other.half_extents;
        delta.x < reach.x && delta.y < reach.y && delta.z < reach.z
    }
}

/// Статичная твёрдая геометрия (пол, платформы, стены)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Volume)]
pub struct Solid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask_contains() {
        let mask = LayerMask::of(&[CollisionLayer::Player, CollisionLayer::Enemy]);
        assert!(mask.contains(CollisionLayer::Player));
        assert!(mask.contains(CollisionLayer::Enemy));
        assert!(!mask.contains(CollisionLayer::Ground));

        assert!(LayerMask::ALL.contains(CollisionLayer::Zone));
        assert!(!LayerMask::NONE.contains(CollisionLayer::Default));
        assert_eq!(LayerMask::ACTORS, mask);
    }

    #[test]
    fn test_tags_any() {
        let tags = Tags::new([Tag::Enemy, Tag::Hazard]);
        assert!(tags.has_any(&[Tag::Player, Tag::Hazard]));
        assert!(!tags.has_any(&[Tag::Player]));
        assert!(!tags.has_any(&[]));
    }

    #[test]
    fn test_volume_overlap() {
        let a = Volume::new(Vec3::splat(0.5));
        let b = Volume::new(Vec3::splat(0.5));

        assert!(a.overlaps(Vec3::ZERO, &b, Vec3::new(0.9, 0.0, 0.0)));
        // Касание граней — не overlap
        assert!(!a.overlaps(Vec3::ZERO, &b, Vec3::new(1.0, 0.0, 0.0)));
        assert!(!a.overlaps(Vec3::ZERO, &b, Vec3::new(0.0, 2.0, 0.0)));
    }
}
