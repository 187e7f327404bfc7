//! Skyledge Simulation Core
//!
//! ECS-симуляция action-платформера на Bevy 0.16 (headless).
//!
//! Фазы тика:
//! - Frame (Update): AI решение → BehaviorCommand → LocomotionCommand →
//!   ground probe / facing / animator
//! - Physics (FixedUpdate, 64Hz): locomotion velocity → gravity + integrate +
//!   landings → контакты → Interaction Sources → урон / смерть
//!
//! Behavior видит результат physics фазы на следующем кадре.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod locomotion;
pub mod logger;
pub mod physics;

// Re-export базовых типов для удобства
pub use ai::{
    ActionZone, Behavior, BehaviorCommand, BehaviorConfig, BehaviorPlugin, BehaviorState,
    StateFilter, TargetSensor, ZoneAction, ZoneDirections,
};
pub use combat::{
    ActorRemoved, CombatPlugin, DamageRequest, DamageResolver, DamageRule, DamageTaken, Dead,
    EntityDied, HealRequest, InteractionEvent, InteractionFilter, InteractionKind,
    InteractionPhase, InteractionSource, MeleeWeapons, MeleeWindow, PointEffector,
};
pub use components::*;
pub use config::{ActorBlueprint, ConfigError, Validate};
pub use locomotion::{
    AnimationSignal, AudioCue, Locomotion, LocomotionCapabilities, LocomotionCommand,
    LocomotionConfig, LocomotionPlugin,
};
pub use logger::init_logger;
pub use physics::{ContactBackend, ContactEvent, Gravity, KinematicPhysicsPlugin};

/// Frame фаза (Update), выполняется по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// AI: смерть, idle таймеры, цели, зоны
    Decide,
    /// BehaviorCommand → LocomotionCommand
    Command,
    /// Исполнение LocomotionCommand, ground probe, facing, animator
    Locomotion,
}

/// Physics фаза (FixedUpdate), выполняется по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedSet {
    /// Locomotion velocity, melee windows
    Integrate,
    /// Gravity, position, landings
    Collide,
    /// ContactEvent (overlap или rapier)
    Detect,
    /// Interaction Sources
    Interact,
    /// Урон, смерть, effectors
    Resolve,
}

/// Fixed timestep physics фазы
pub const FIXED_HZ: f64 = 64.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin {
    pub contacts: ContactBackend,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            contacts: ContactBackend::Overlap,
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            // Детерминистичный RNG (seed по умолчанию)
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 64Hz для physics фазы
            .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
            .configure_sets(
                Update,
                (FrameSet::Decide, FrameSet::Command, FrameSet::Locomotion).chain(),
            )
            .configure_sets(
                FixedUpdate,
                (
                    FixedSet::Integrate,
                    FixedSet::Collide,
                    FixedSet::Detect,
                    FixedSet::Interact,
                    FixedSet::Resolve,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((
                KinematicPhysicsPlugin {
                    contacts: self.contacts,
                },
                LocomotionPlugin,
                CombatPlugin,
                BehaviorPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin::default());

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

/// Spawn актора по blueprint
///
/// Все конфиги валидируются до spawn: при ошибке entity не создаётся.
pub fn spawn_actor(
    commands: &mut Commands,
    blueprint: &ActorBlueprint,
    position: Vec3,
) -> Result<Entity, ConfigError> {
    blueprint.validate()?;

    let locomotion = Locomotion::new(blueprint.locomotion, blueprint.capabilities)?;
    let health = Health::from_config(&blueprint.health)?;
    let behavior = blueprint.behavior.map(Behavior::new).transpose()?;
    let contact_damage = blueprint
        .contact_damage
        .clone()
        .map(DamageResolver::new)
        .transpose()?;

    let facing = blueprint
        .behavior
        .map_or(Facing::Right, |config| config.initial_facing);

    let mut entity = commands.spawn((
        Actor,
        health,
        blueprint.health,
        locomotion,
        Body {
            facing,
            ..Default::default()
        },
        Transform::from_translation(position),
        Volume::new(Vec3::from_array(blueprint.half_extents)),
        PhysicsLayer(blueprint.layer),
        Tags::new(blueprint.tags.iter().copied()),
    ));

    if blueprint.capabilities.sprite_flip {
        entity.insert(SpriteFlip {
            flip_x: facing == Facing::Left,
        });
    }

    if let Some(behavior) = behavior {
        entity.insert(behavior);
    }

    if let Some(resolver) = contact_damage {
        let layers = resolver.rule.layers.unwrap_or(LayerMask::ALL);
        entity.insert((
            InteractionSource::collision(InteractionFilter::layers(layers)),
            resolver,
        ));
    }

    Ok(entity.id())
}

/// Spawn статичной геометрии (земля, платформы)
pub fn spawn_solid(
    commands: &mut Commands,
    center: Vec3,
    half_extents: Vec3,
    layer: CollisionLayer,
) -> Entity {
    commands
        .spawn((
            Solid,
            Transform::from_translation(center),
            Volume::new(half_extents),
            PhysicsLayer(layer),
        ))
        .id()
}

/// Spawn Action Zone (trigger, реагирует на слои `filter`)
///
/// Зона могла прийти из JSON в обход `ActionZone::new`, поэтому валидируем здесь.
pub fn spawn_zone(
    commands: &mut Commands,
    zone: ActionZone,
    center: Vec3,
    half_extents: Vec3,
    filter: InteractionFilter,
) -> Result<Entity, ConfigError> {
    zone.validate()?;

    Ok(commands
        .spawn((
            zone,
            InteractionSource::trigger(filter),
            Transform::from_translation(center),
            Volume::new(half_extents),
            PhysicsLayer(CollisionLayer::Zone),
        ))
        .id())
}

/// Spawn источника урона (шипы, лава, снаряд)
pub fn spawn_hazard(
    commands: &mut Commands,
    rule: DamageRule,
    kind: InteractionKind,
    center: Vec3,
    half_extents: Vec3,
) -> Result<Entity, ConfigError> {
    let resolver = DamageResolver::new(rule)?;
    let layers = resolver.rule.layers.unwrap_or(LayerMask::ALL);

    Ok(commands
        .spawn((
            InteractionSource::new(kind, InteractionFilter::layers(layers)),
            resolver,
            Transform::from_translation(center),
            Volume::new(half_extents),
            PhysicsLayer(CollisionLayer::Hazard),
            Tags::new([Tag::Hazard]),
        ))
        .id())
}

/// Spawn детектора цели, привязанного к владельцу
pub fn spawn_target_sensor(
    commands: &mut Commands,
    owner: Entity,
    half_extents: Vec3,
    filter: InteractionFilter,
) -> Entity {
    commands
        .spawn((
            TargetSensor { owner },
            InteractionSource::trigger(filter).ignoring(owner),
            Attachment::new(owner, Vec3::ZERO),
            Transform::default(),
            Volume::new(half_extents),
            PhysicsLayer(CollisionLayer::Zone),
        ))
        .id()
}

/// Spawn пары melee хитбоксов (слева и справа от актора)
///
/// Хитбоксы выключены, пока не придёт MeleeWindow { open: true }.
pub fn spawn_melee_weapons(
    commands: &mut Commands,
    actor: Entity,
    reach: f32,
    half_extents: Vec3,
    rule: DamageRule,
) -> Result<MeleeWeapons, ConfigError> {
    let left_resolver = DamageResolver::new(rule.clone())?;
    let right_resolver = DamageResolver::new(rule)?;
    let layers = left_resolver.rule.layers.unwrap_or(LayerMask::ALL);

    let mut hitbox = |resolver: DamageResolver, side: Facing| {
        commands
            .spawn((
                InteractionSource::trigger(InteractionFilter::layers(layers))
                    .ignoring(actor)
                    .disabled(),
                resolver,
                Attachment::new(actor, Vec3::new(reach * side.sign(), 0.0, 0.0)),
                Transform::default(),
                Volume::new(half_extents),
                PhysicsLayer(CollisionLayer::Hazard),
            ))
            .id()
    };

    let weapons = MeleeWeapons::new(
        hitbox(left_resolver, Facing::Left),
        hitbox(right_resolver, Facing::Right),
    );
    commands.entity(actor).insert(weapons);

    Ok(weapons)
}

// Логгер (глобальный, как в presentation слое)
pub use logger::{log, log_error, log_info, log_warning, LogLevel, LogPrinter};
