//! Damage Resolver: Interaction Start/Active → Health
//!
//! Cooldown считается отдельно для каждой пары (resolver, target).
//! Мёртвые цели игнорируются (clock не сбрасывается, self-destruct не срабатывает).

use std::collections::HashMap;

use bevy::ecs::entity::Entities;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::interaction::{InteractionEvent, InteractionPhase};
use crate::components::{
    CollisionLayer, DamageOutcome, Health, HealthConfig, LayerMask, PhysicsLayer, Tag, Tags,
};
use crate::config::{non_negative, ConfigError, Validate};

/// Правило урона (immutable per resolver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct DamageRule {
    pub amount: f32,
    /// Минимальный интервал между попаданиями по одной цели (секунды)
    pub rate: f32,
    /// None → любые теги
    pub tags: Option<Vec<Tag>>,
    /// None → любые слои
    pub layers: Option<LayerMask>,
    /// Удалить источник после первого попадания (снаряды)
    pub destroy_self_on_hit: bool,
}

impl Default for DamageRule {
    fn default() -> Self {
        Self {
            amount: 10.0,
            rate: 1.0,
            tags: None,
            layers: None,
            destroy_self_on_hit: false,
        }
    }
}

impl Validate for DamageRule {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("damage.amount", self.amount)?;
        non_negative("damage.rate", self.rate)
    }
}

impl DamageRule {
    pub fn accepts(&self, layer: CollisionLayer, tags: Option<&Tags>) -> bool {
        if let Some(layers) = self.layers {
            if !layers.contains(layer) {
                return false;
            }
        }
        match &self.tags {
            None => true,
            Some(wanted) => tags.is_some_and(|t| t.has_any(wanted)),
        }
    }
}

/// Damage Resolver (живёт на entity с InteractionSource)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DamageResolver {
    pub rule: DamageRule,
    /// Время последнего попадания по каждой цели
    #[reflect(ignore)]
    last_hit: HashMap<Entity, f32>,
}

impl DamageResolver {
    pub fn new(rule: DamageRule) -> Result<Self, ConfigError> {
        rule.validate()?;
        Ok(Self {
            rule,
            last_hit: HashMap::new(),
        })
    }

    /// Cooldown по цели прошёл (`now - last >= rate`)
    pub fn is_ready(&self, target: Entity, now: f32) -> bool {
        match self.last_hit.get(&target) {
            Some(&last) => now - last >= self.rule.rate,
            None => true,
        }
    }

    pub fn record_hit(&mut self, target: Entity, now: f32) {
        self.last_hit.insert(target, now);
    }

    /// is_ready + record_hit
    pub fn try_hit(&mut self, target: Entity, now: f32) -> bool {
        if !self.is_ready(target, now) {
            return false;
        }
        self.record_hit(target, now);
        true
    }

    pub fn last_hit(&self, target: Entity) -> Option<f32> {
        self.last_hit.get(&target).copied()
    }

    /// Контакт закончился: забыть цель, если её cooldown уже прошёл
    /// или она удалена из мира. Иначе clock держим до повторного входа.
    pub fn release(&mut self, target: Entity, now: f32, despawned: bool) {
        if despawned || self.is_ready(target, now) {
            self.last_hit.remove(&target);
        }
    }

    /// Сколько целей сейчас с clock'ом
    pub fn tracked_targets(&self) -> usize {
        self.last_hit.len()
    }
}

/// Событие: урон прошёл (до проверки смерти)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageTaken {
    pub source: Option<Entity>,
    pub target: Entity,
    pub amount: f32,
    /// Здоровье после урона
    pub remaining: f32,
}

/// Событие: entity умер (ровно один раз на entity)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Событие: мёртвый актор удалён из мира
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorRemoved {
    pub entity: Entity,
}

/// Запрос прямого урона (kill zones, скрипты)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    pub source: Option<Entity>,
}

/// Запрос лечения
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}

/// Компонент-маркер: entity мертв
///
/// Locomotion и Behavior перестают принимать команды.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Отложенное удаление мёртвого актора
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// ApplyDamage + нотификации
fn deal_damage(
    health: &mut Health,
    target: Entity,
    source: Option<Entity>,
    amount: f32,
    damage_events: &mut EventWriter<DamageTaken>,
    died_events: &mut EventWriter<EntityDied>,
) -> DamageOutcome {
    let outcome = health.apply_damage(amount);

    match outcome {
        DamageOutcome::Ignored => {}
        DamageOutcome::Damaged { remaining } => {
            damage_events.write(DamageTaken {
                source,
                target,
                amount,
                remaining,
            });
        }
        DamageOutcome::Killed => {
            damage_events.write(DamageTaken {
                source,
                target,
                amount,
                remaining: 0.0,
            });
            died_events.write(EntityDied {
                entity: target,
                killer: source,
            });
            crate::logger::log_info(&format!("Entity {:?} killed by {:?}", target, source));
        }
    }

    outcome
}

/// Система: Interaction Start/Active → урон (FixedSet::Resolve)
pub fn resolve_damage(
    mut commands: Commands,
    time: Res<Time>,
    entities: &Entities,
    mut interactions: EventReader<InteractionEvent>,
    mut resolvers: Query<&mut DamageResolver>,
    mut targets: Query<(&mut Health, Option<&PhysicsLayer>, Option<&Tags>)>,
    mut damage_events: EventWriter<DamageTaken>,
    mut died_events: EventWriter<EntityDied>,
) {
    let now = time.elapsed_secs();
    let mut destroyed: Vec<Entity> = Vec::new();

    for event in interactions.read() {
        if destroyed.contains(&event.source) {
            continue;
        }

        if event.phase == InteractionPhase::End {
            if let Ok(mut resolver) = resolvers.get_mut(event.source) {
                resolver.release(event.target, now, !entities.contains(event.target));
            }
            continue;
        }

        let Ok(mut resolver) = resolvers.get_mut(event.source) else {
            continue;
        };
        let Ok((mut health, layer, tags)) = targets.get_mut(event.target) else {
            continue;
        };

        if health.is_dead() {
            continue;
        }

        let layer = layer.map_or(CollisionLayer::Default, |l| l.0);
        if !resolver.rule.accepts(layer, tags) || !resolver.try_hit(event.target, now) {
            continue;
        }

        let amount = resolver.rule.amount;
        deal_damage(
            &mut health,
            event.target,
            Some(event.source),
            amount,
            &mut damage_events,
            &mut died_events,
        );

        if resolver.rule.destroy_self_on_hit {
            destroyed.push(event.source);
            commands.entity(event.source).try_despawn();
            crate::logger::log(&format!("Damage source {:?} destroyed on hit", event.source));
        }
    }
}

/// Система: прямые DamageRequest / HealRequest
pub fn apply_health_requests(
    mut damage_requests: EventReader<DamageRequest>,
    mut heal_requests: EventReader<HealRequest>,
    mut targets: Query<&mut Health>,
    mut damage_events: EventWriter<DamageTaken>,
    mut died_events: EventWriter<EntityDied>,
) {
    for request in damage_requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            continue;
        };
        deal_damage(
            &mut health,
            request.target,
            request.source,
            request.amount,
            &mut damage_events,
            &mut died_events,
        );
    }

    for request in heal_requests.read() {
        if let Ok(mut health) = targets.get_mut(request.target) {
            health.heal(request.amount);
        }
    }
}

/// Система: EntityDied → Dead маркер (+ DespawnAfter по HealthConfig)
pub fn mark_dead(
    mut commands: Commands,
    time: Res<Time>,
    mut death_events: EventReader<EntityDied>,
    configs: Query<Option<&HealthConfig>>,
) {
    for event in death_events.read() {
        let Ok(config) = configs.get(event.entity) else {
            continue;
        };
        let Ok(mut entity_commands) = commands.get_entity(event.entity) else {
            continue;
        };

        entity_commands.insert(Dead);

        if let Some(config) = config.filter(|c| c.destroy_on_death) {
            entity_commands.insert(DespawnAfter {
                despawn_time: time.elapsed_secs() + config.destroy_delay,
            });
        }
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time>,
    mut removed_events: EventWriter<ActorRemoved>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::logger::log(&format!("Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).try_despawn();
            removed_events.write(ActorRemoved { entity });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spikes(rate: f32) -> DamageResolver {
        DamageResolver::new(DamageRule {
            amount: 30.0,
            rate,
            ..Default::default()
        })
        .expect("valid rule")
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let rule = DamageRule {
            amount: -1.0,
            ..Default::default()
        };
        assert!(DamageResolver::new(rule).is_err());
    }

    #[test]
    fn test_cooldown_scenario_final_health_40() {
        let target = Entity::from_raw(10);
        let mut resolver = spikes(1.0);
        let mut health = Health::new(100.0);

        // Контакты в t = 0, 0.5, 1.0
        for now in [0.0, 0.5, 1.0] {
            if resolver.try_hit(target, now) {
                health.apply_damage(resolver.rule.amount);
            }
        }

        assert_eq!(health.current(), 40.0);
    }

    #[test]
    fn test_cooldown_is_per_target() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let mut resolver = spikes(1.0);

        assert!(resolver.try_hit(a, 0.0));
        assert!(resolver.try_hit(b, 0.2));
        assert!(!resolver.try_hit(a, 0.5));
        assert!(!resolver.try_hit(b, 0.9));
        assert!(resolver.try_hit(a, 1.0));
    }

    #[test]
    fn test_suppressed_hit_does_not_reset_clock() {
        let target = Entity::from_raw(5);
        let mut resolver = spikes(1.0);

        assert!(resolver.try_hit(target, 0.0));
        assert!(!resolver.try_hit(target, 0.9));
        assert_eq!(resolver.last_hit(target), Some(0.0));
    }

    #[test]
    fn test_release_prunes_only_cooled_down_targets() {
        let target = Entity::from_raw(5);
        let mut resolver = spikes(1.0);

        assert!(resolver.try_hit(target, 0.0));

        // Вышел до конца cooldown → clock сохраняется (повторный вход не даёт урон)
        resolver.release(target, 0.5, false);
        assert_eq!(resolver.last_hit(target), Some(0.0));
        assert!(!resolver.try_hit(target, 0.6));

        resolver.release(target, 1.2, false);
        assert_eq!(resolver.tracked_targets(), 0);
    }

    #[test]
    fn test_release_drops_despawned_target() {
        let mut resolver = spikes(10.0);
        for index in 0..50 {
            let target = Entity::from_raw(index);
            assert!(resolver.try_hit(target, 0.0));
            resolver.release(target, 0.1, true);
        }
        assert_eq!(resolver.tracked_targets(), 0);
    }

    #[test]
    fn test_zero_rate_hits_every_time() {
        let target = Entity::from_raw(5);
        let mut resolver = spikes(0.0);
        assert!(resolver.try_hit(target, 0.0));
        assert!(resolver.try_hit(target, 0.0));
    }

    #[test]
    fn test_rule_filters() {
        let rule = DamageRule {
            layers: Some(LayerMask::of(&[CollisionLayer::Player])),
            tags: Some(vec![Tag::Player]),
            ..Default::default()
        };
        let player_tags = Tags::new([Tag::Player]);

        assert!(rule.accepts(CollisionLayer::Player, Some(&player_tags)));
        assert!(!rule.accepts(CollisionLayer::Enemy, Some(&player_tags)));
        assert!(!rule.accepts(CollisionLayer::Player, None));
        assert!(DamageRule::default().accepts(CollisionLayer::Default, None));
    }
}
