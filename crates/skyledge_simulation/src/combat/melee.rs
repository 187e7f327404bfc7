//! Melee windows с учётом facing
//!
//! У актора два weapon источника (левый и правый хитбокс). Окно атаки
//! включает только тот, что смотрит по facing. Пока окно открыто,
//! разворот переключает хитбоксы.

use bevy::prelude::*;

use crate::combat::interaction::InteractionSource;
use crate::components::{Body, Facing};

/// Weapon хитбоксы актора (entity с InteractionSource)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct MeleeWeapons {
    pub left: Entity,
    pub right: Entity,
    /// Окно атаки открыто
    pub open: bool,
}

impl MeleeWeapons {
    pub fn new(left: Entity, right: Entity) -> Self {
        Self {
            left,
            right,
            open: false,
        }
    }

    /// (entity, enabled) для обоих хитбоксов
    pub fn desired(&self, facing: Facing) -> [(Entity, bool); 2] {
        [
            (self.left, self.open && facing == Facing::Left),
            (self.right, self.open && facing == Facing::Right),
        ]
    }
}

/// Открыть / закрыть окно атаки (animation event, input)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeWindow {
    pub actor: Entity,
    pub open: bool,
}

/// Система: MeleeWindow события → MeleeWeapons.open
pub fn handle_melee_windows(
    mut windows: EventReader<MeleeWindow>,
    mut actors: Query<&mut MeleeWeapons>,
) {
    for window in windows.read() {
        if let Ok(mut weapons) = actors.get_mut(window.actor) {
            weapons.open = window.open;
        }
    }
}

/// Система: enabled хитбоксов по facing
pub fn sync_melee_hitboxes(
    actors: Query<(&MeleeWeapons, &Body)>,
    mut sources: Query<&mut InteractionSource>,
) {
    for (weapons, body) in actors.iter() {
        for (entity, enabled) in weapons.desired(body.facing) {
            let Ok(mut source) = sources.get_mut(entity) else {
                continue;
            };
            if source.enabled != enabled {
                source.enabled = enabled;
            }
        }
    }
}
