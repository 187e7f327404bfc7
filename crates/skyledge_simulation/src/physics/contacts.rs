//! Контакты physics backend'а → ContactEvent
//!
//! Backend-agnostic событие: его пишет либо headless overlap детектор
//! (AABB diff каждый physics тик), либо Rapier bridge.
//! Классификацию в Start/Active/End делают Interaction Sources.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::combat::{InteractionKind, InteractionSource};
use crate::components::{Solid, Volume};

/// Зазор, при котором Collision-источник уже "касается" (resting contact)
pub const CONTACT_SKIN: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    Began,
    Ended,
}

/// Контакт двух entity (симметричный, порядок a/b не важен)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub a: Entity,
    pub b: Entity,
    /// true → сенсорное перекрытие (trigger), false → твёрдый контакт
    pub sensor: bool,
    pub phase: ContactPhase,
}

/// Перекрытия прошлого тика: (source, other) → sensor
///
/// BTreeMap → детерминированный порядок событий.
#[derive(Resource, Debug, Default)]
pub struct OverlapCache {
    pairs: BTreeMap<(Entity, Entity), bool>,
}

impl OverlapCache {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Система: headless overlap детектор
///
/// Для каждого включённого InteractionSource ищем перекрытия с любыми
/// Volume (кроме статичной геометрии). Diff с прошлым тиком → Began/Ended.
/// Despawned entity пропадает из перекрытий → Ended.
pub fn detect_overlaps(
    mut cache: ResMut<OverlapCache>,
    sources: Query<(Entity, &Transform, &Volume, &InteractionSource)>,
    others: Query<(Entity, &Transform, &Volume), Without<Solid>>,
    mut contacts: EventWriter<ContactEvent>,
) {
    let mut current: BTreeMap<(Entity, Entity), bool> = BTreeMap::new();

    for (source_entity, source_transform, source_volume, source) in sources.iter() {
        if !source.enabled {
            continue;
        }

        let sensor = source.kind == InteractionKind::Trigger;
        let reach = if sensor {
            *source_volume
        } else {
            Volume::new(source_volume.half_extents + Vec3::splat(CONTACT_SKIN))
        };

        for (other, other_transform, other_volume) in others.iter() {
            if other == source_entity {
                continue;
            }
            if reach.overlaps(source_transform.translation, other_volume, other_transform.translation) {
                current.insert((source_entity, other), sensor);
            }
        }
    }

    for (&(a, b), &sensor) in cache.pairs.iter() {
        if !current.contains_key(&(a, b)) {
            contacts.write(ContactEvent {
                a,
                b,
                sensor,
                phase: ContactPhase::Ended,
            });
        }
    }

    for (&(a, b), &sensor) in current.iter() {
        if !cache.pairs.contains_key(&(a, b)) {
            contacts.write(ContactEvent {
                a,
                b,
                sensor,
                phase: ContactPhase::Began,
            });
        }
    }

    cache.pairs = current;
}
