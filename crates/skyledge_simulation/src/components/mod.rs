//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: живые существа (Actor, Player, Health, HealthConfig)
//! - attachment: привязка к владельцу (хитбоксы, сенсоры)
//! - movement: физическое тело (Body, Facing, SpriteFlip)
//! - world: слои, теги, объёмы, статичная геометрия (LayerMask, Tags, Volume, Solid)

pub mod actor;
pub mod attachment;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use attachment::*;
pub use movement::*;
pub use world::*;
