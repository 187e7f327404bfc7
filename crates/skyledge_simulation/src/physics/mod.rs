//! Physics backend
//!
//! Kinematic интеграция тел, ground probe, детекция контактов.
//! Контакты: headless AABB overlap (по умолчанию) или Rapier bridge.

use bevy::prelude::*;

pub mod contacts;
pub mod kinematic;
pub mod probe;
pub mod rapier_bridge;

// Re-export основных типов
pub use contacts::{ContactEvent, ContactPhase, OverlapCache};
pub use kinematic::Gravity;
pub use probe::{GroundContact, GroundProbe};

use crate::FixedSet;

/// Кто поставляет ContactEvent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactBackend {
    /// Headless AABB overlap детектор
    #[default]
    Overlap,
    /// bevy_rapier3d CollisionEvent (RapierPhysicsPlugin добавляет хост)
    Rapier,
}

/// Physics Plugin
///
/// FixedUpdate:
/// 1. FixedSet::Collide — gravity → integrate → landings → attachments
/// 2. FixedSet::Detect — контакты (overlap или rapier)
pub struct KinematicPhysicsPlugin {
    pub contacts: ContactBackend,
}

impl Plugin for KinematicPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Gravity>().add_event::<ContactEvent>();

        app.add_systems(
            FixedUpdate,
            (
                kinematic::apply_gravity,
                kinematic::integrate_bodies,
                kinematic::resolve_landings,
                kinematic::sync_attachments,
            )
                .chain()
                .in_set(FixedSet::Collide),
        );

        match self.contacts {
            ContactBackend::Overlap => {
                app.init_resource::<OverlapCache>()
                    .add_systems(FixedUpdate, contacts::detect_overlaps.in_set(FixedSet::Detect));
            }
            ContactBackend::Rapier => {
                // Гарантируем наличие Events<CollisionEvent> даже без RapierPhysicsPlugin
                app.add_event::<bevy_rapier3d::prelude::CollisionEvent>()
                    .add_systems(
                        FixedUpdate,
                        (
                            rapier_bridge::attach_rapier_colliders,
                            rapier_bridge::forward_rapier_collisions,
                        )
                            .chain()
                            .in_set(FixedSet::Detect),
                    );
            }
        }
    }
}
