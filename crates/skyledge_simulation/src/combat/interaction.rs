//! Interaction Source: классификация контактов в Start / Active / End
//!
//! ContactEvent (от physics backend'а) → фильтр (слой + теги) → InteractionEvent.
//! Active шлётся раз в physics тик для каждого удерживаемого контакта,
//! но не в тик Start.

use std::collections::BTreeSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{CollisionLayer, LayerMask, PhysicsLayer, Tag, Tags, Volume};
use crate::physics::{ContactEvent, ContactPhase};

/// Какие контакты принимает источник
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum InteractionKind {
    /// Твёрдые контакты (шипы, тело слизня)
    #[default]
    Collision,
    /// Сенсорные перекрытия (зоны, оружие, детекторы)
    Trigger,
}

impl InteractionKind {
    pub fn accepts(self, sensor: bool) -> bool {
        match self {
            InteractionKind::Collision => !sensor,
            InteractionKind::Trigger => sensor,
        }
    }
}

/// Фильтр кандидатов: слой в маске И (нет тегов ИЛИ есть любой из тегов)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct InteractionFilter {
    pub layers: LayerMask,
    pub tags: Option<Vec<Tag>>,
}

impl Default for InteractionFilter {
    fn default() -> Self {
        Self {
            layers: LayerMask::ALL,
            tags: None,
        }
    }
}

impl InteractionFilter {
    pub fn layers(layers: LayerMask) -> Self {
        Self { layers, tags: None }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    pub fn accepts(&self, layer: CollisionLayer, tags: Option<&Tags>) -> bool {
        if !self.layers.contains(layer) {
            return false;
        }
        match &self.tags {
            None => true,
            Some(wanted) => tags.is_some_and(|t| t.has_any(wanted)),
        }
    }
}

/// Interaction Source
///
/// Держит множество текущих контактов. Выключенный источник (`enabled = false`)
/// отпускает все контакты (End) и не принимает новые.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform, Volume)]
pub struct InteractionSource {
    pub kind: InteractionKind,
    pub filter: InteractionFilter,
    pub enabled: bool,
    /// Владелец (свой хитбокс / сенсор не видит своего актора)
    pub ignore: Option<Entity>,
    #[reflect(ignore)]
    active: BTreeSet<Entity>,
}

impl Default for InteractionSource {
    fn default() -> Self {
        Self::new(InteractionKind::Collision, InteractionFilter::default())
    }
}

impl InteractionSource {
    pub fn new(kind: InteractionKind, filter: InteractionFilter) -> Self {
        Self {
            kind,
            filter,
            enabled: true,
            ignore: None,
            active: BTreeSet::new(),
        }
    }

    pub fn trigger(filter: InteractionFilter) -> Self {
        Self::new(InteractionKind::Trigger, filter)
    }

    pub fn collision(filter: InteractionFilter) -> Self {
        Self::new(InteractionKind::Collision, filter)
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn ignoring(mut self, owner: Entity) -> Self {
        self.ignore = Some(owner);
        self
    }

    /// Текущие контакты (детерминированный порядок)
    pub fn contacts(&self) -> impl Iterator<Item = Entity> + '_ {
        self.active.iter().copied()
    }

    pub fn is_touching(&self, target: Entity) -> bool {
        self.active.contains(&target)
    }

    /// Начало контакта. Some(Start) если контакт новый и прошёл фильтр.
    pub fn begin(
        &mut self,
        target: Entity,
        sensor: bool,
        layer: CollisionLayer,
        tags: Option<&Tags>,
    ) -> Option<InteractionPhase> {
        if !self.enabled
            || self.ignore == Some(target)
            || !self.kind.accepts(sensor)
            || !self.filter.accepts(layer, tags)
        {
            return None;
        }
        self.active.insert(target).then_some(InteractionPhase::Start)
    }

    /// Конец контакта. Some(End) только для ранее начатых.
    pub fn end(&mut self, target: Entity) -> Option<InteractionPhase> {
        self.active.remove(&target).then_some(InteractionPhase::End)
    }

    /// Отпустить всё (выключение источника)
    pub fn release_all(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.active).into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum InteractionPhase {
    Start,
    Active,
    End,
}

/// Классифицированный контакт источника с целью
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionEvent {
    pub source: Entity,
    pub target: Entity,
    pub phase: InteractionPhase,
}

/// Система: ContactEvent → InteractionEvent (FixedSet::Interact)
///
/// Порядок внутри тика:
/// 1. Выключенные источники отпускают контакты (End)
/// 2. Began/Ended этого тика → Start/End
/// 3. Active для контактов, которые держатся и начались не в этом тике
///    (пропавшие entity → End)
pub fn classify_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut sources: Query<(Entity, &mut InteractionSource)>,
    candidates: Query<(Option<&PhysicsLayer>, Option<&Tags>)>,
    mut interactions: EventWriter<InteractionEvent>,
) {
    for (source_entity, mut source) in sources.iter_mut() {
        if source.enabled {
            continue;
        }
        for target in source.release_all() {
            interactions.write(InteractionEvent {
                source: source_entity,
                target,
                phase: InteractionPhase::End,
            });
        }
    }

    let mut started: BTreeSet<(Entity, Entity)> = BTreeSet::new();

    for contact in contacts.read() {
        // Контакт симметричный: каждая сторона может быть источником
        for (source_entity, target) in [(contact.a, contact.b), (contact.b, contact.a)] {
            let Ok((_, mut source)) = sources.get_mut(source_entity) else {
                continue;
            };

            let phase = match contact.phase {
                ContactPhase::Began => {
                    let Ok((layer, tags)) = candidates.get(target) else {
                        continue;
                    };
                    let layer = layer.map_or(CollisionLayer::Default, |l| l.0);
                    source.begin(target, contact.sensor, layer, tags)
                }
                ContactPhase::Ended => source.end(target),
            };

            if let Some(phase) = phase {
                if phase == InteractionPhase::Start {
                    started.insert((source_entity, target));
                }
                interactions.write(InteractionEvent {
                    source: source_entity,
                    target,
                    phase,
                });
            }
        }
    }

    for (source_entity, mut source) in sources.iter_mut() {
        if !source.enabled {
            continue;
        }

        let held: Vec<Entity> = source.contacts().collect();
        for target in held {
            if started.contains(&(source_entity, target)) {
                continue;
            }
            let phase = if candidates.contains(target) {
                InteractionPhase::Active
            } else {
                // Despawn без Ended от backend'а
                source.end(target);
                InteractionPhase::End
            };
            interactions.write(InteractionEvent {
                source: source_entity,
                target,
                phase,
            });
        }
    }
}
