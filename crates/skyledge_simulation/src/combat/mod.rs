//! Combat system module
//!
//! Pipeline (FixedUpdate, 64Hz):
//! ContactEvent → Interaction Source (Start/Active/End) → Damage Resolver →
//! Health → EntityDied → Dead / DespawnAfter → ActorRemoved
//!
//! Дополнительно: point effectors (радиальная сила) и melee windows.

use bevy::prelude::*;

pub mod damage;
pub mod effectors;
pub mod interaction;
pub mod melee;

// Re-export основных типов
pub use damage::{
    ActorRemoved, DamageRequest, DamageResolver, DamageRule, DamageTaken, Dead, DespawnAfter,
    EntityDied, HealRequest,
};
pub use effectors::{inverse_lerp, PointEffector};
pub use interaction::{
    InteractionEvent, InteractionFilter, InteractionKind, InteractionPhase, InteractionSource,
};
pub use melee::{MeleeWeapons, MeleeWindow};

use crate::FixedSet;

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. FixedSet::Integrate — melee windows → enabled хитбоксов
/// 2. FixedSet::Interact — classify_contacts
/// 3. FixedSet::Resolve (chain):
///    resolve_damage → apply_health_requests → apply_point_effectors →
///    mark_dead → despawn_after_timeout
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<InteractionEvent>()
            .add_event::<DamageTaken>()
            .add_event::<EntityDied>()
            .add_event::<ActorRemoved>()
            .add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<MeleeWindow>();

        app.add_systems(
            FixedUpdate,
            (melee::handle_melee_windows, melee::sync_melee_hitboxes)
                .chain()
                .in_set(FixedSet::Integrate),
        );

        app.add_systems(
            FixedUpdate,
            interaction::classify_contacts.in_set(FixedSet::Interact),
        );

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: урон и лечение
                damage::resolve_damage,
                damage::apply_health_requests,
                effectors::apply_point_effectors,
                // Фаза 2: смерть
                damage::mark_dead,
                damage::despawn_after_timeout,
            )
                .chain()
                .in_set(FixedSet::Resolve),
        );
    }
}
