//! Attachment: entity, который следует за владельцем (хитбоксы, сенсоры)
//!
//! Иерархии трансформов в headless режиме нет, поэтому позицию копируем
//! сами после интеграции тел.

use bevy::prelude::*;

/// Привязка к владельцу со смещением
///
/// `mirror_x` → смещение по X зеркалится по facing владельца.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Attachment {
    pub owner: Entity,
    pub offset: Vec3,
    pub mirror_x: bool,
}

impl Attachment {
    pub fn new(owner: Entity, offset: Vec3) -> Self {
        Self {
            owner,
            offset,
            mirror_x: false,
        }
    }

    pub fn mirrored(mut self) -> Self {
        self.mirror_x = true;
        self
    }

    /// Мировая позиция attachment'а
    pub fn position(&self, owner_position: Vec3, facing_sign: f32) -> Vec3 {
        let mut offset = self.offset;
        if self.mirror_x {
            offset.x *= facing_sign;
        }
        owner_position + offset
    }
}
