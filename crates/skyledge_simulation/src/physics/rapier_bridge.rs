//! Rapier bridge: коллайдеры + CollisionEvent → ContactEvent
//!
//! Архитектура (как в headless режиме):
//! - Позицию и velocity интегрируем сами (RigidBody::KinematicPositionBased)
//! - Rapier только детектит контакты и сенсорные перекрытия
//! - RapierPhysicsPlugin подключает хост, мы только читаем его события

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

use crate::combat::{InteractionKind, InteractionSource};
use crate::components::{Body, CollisionLayer, LayerMask, PhysicsLayer, Solid, Volume};
use crate::physics::contacts::{ContactEvent, ContactPhase};

/// Как entity участвует в симуляции Rapier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RapierBodyKind {
    /// Персонаж (двигаем сами)
    Character,
    /// Статичная геометрия
    Static,
    /// Сенсор (ActionZone, trigger hazard)
    Sensor,
}

/// CollisionGroups из наших слоёв: membership = слой, filter = маска
pub fn collision_groups(layer: CollisionLayer, filter: LayerMask) -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(layer.bit()),
        Group::from_bits_truncate(filter.0),
    )
}

/// Навесить Rapier коллайдер (cuboid по Volume) на entity
pub fn attach_rapier_collider(
    entity: &mut EntityCommands,
    volume: &Volume,
    kind: RapierBodyKind,
    layer: CollisionLayer,
    filter: LayerMask,
) {
    let half = volume.half_extents;
    let rigid_body = match kind {
        RapierBodyKind::Character => RigidBody::KinematicPositionBased,
        RapierBodyKind::Static | RapierBodyKind::Sensor => RigidBody::Fixed,
    };

    entity.insert((
        rigid_body,
        Collider::cuboid(half.x, half.y, half.z),
        ActiveEvents::COLLISION_EVENTS,
        // Kinematic ↔ Fixed события по умолчанию выключены
        ActiveCollisionTypes::all(),
        collision_groups(layer, filter),
    ));

    if kind == RapierBodyKind::Sensor {
        entity.insert(Sensor);
    }
}

/// Тип Rapier тела по нашим компонентам
pub fn body_kind(solid: bool, body: bool, source: Option<&InteractionSource>) -> RapierBodyKind {
    if solid {
        RapierBodyKind::Static
    } else if source.is_some_and(|s| s.kind == InteractionKind::Trigger) {
        RapierBodyKind::Sensor
    } else if body {
        RapierBodyKind::Character
    } else {
        RapierBodyKind::Static
    }
}

/// Система: коллайдеры для новых Volume
pub fn attach_rapier_colliders(
    mut commands: Commands,
    added: Query<
        (Entity, &Volume, Option<&PhysicsLayer>, Has<Solid>, Has<Body>, Option<&InteractionSource>),
        Added<Volume>,
    >,
) {
    for (entity, volume, layer, solid, body, source) in added.iter() {
        let kind = body_kind(solid, body, source);
        let layer = layer.map_or(CollisionLayer::Default, |l| l.0);
        attach_rapier_collider(&mut commands.entity(entity), volume, kind, layer, LayerMask::ALL);
    }
}

/// Конвертация одного CollisionEvent
pub fn to_contact_event(event: &CollisionEvent) -> ContactEvent {
    match *event {
        CollisionEvent::Started(a, b, flags) => ContactEvent {
            a,
            b,
            sensor: flags.contains(CollisionEventFlags::SENSOR),
            phase: ContactPhase::Began,
        },
        CollisionEvent::Stopped(a, b, flags) => ContactEvent {
            a,
            b,
            sensor: flags.contains(CollisionEventFlags::SENSOR),
            phase: ContactPhase::Ended,
        },
    }
}

/// Система: пересылка Rapier событий в ContactEvent
pub fn forward_rapier_collisions(
    mut collisions: EventReader<CollisionEvent>,
    mut contacts: EventWriter<ContactEvent>,
) {
    for event in collisions.read() {
        contacts.write(to_contact_event(event));
    }
}
