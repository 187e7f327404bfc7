//! Action Zones: статичные trigger зоны, которые командуют вошедшим врагом
//!
//! Проверки при входе (InteractionEvent::Start от собственного trigger'а зоны):
//! 1. состояние (StateFilter)
//! 2. шанс (uniform [0,1) > chance → пропуск; chance ≤ 0 → никогда)
//! 3. маска направления по горизонтальной скорости

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::behavior::{Behavior, BehaviorState, StateFilter};
use crate::ai::events::BehaviorCommand;
use crate::combat::{InteractionEvent, InteractionPhase};
use crate::components::Body;
use crate::config::{in_range, non_negative, ConfigError, Validate};
use crate::locomotion::Locomotion;
use crate::DeterministicRng;

/// Действие зоны
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub enum ZoneAction {
    /// Пауза (секунды)
    Idle(f32),
    FaceLeft,
    FaceRight,
    FlipDirection,
    RandomDirection,
    Jump,
}

impl ZoneAction {
    pub fn command(self, entity: Entity) -> BehaviorCommand {
        match self {
            ZoneAction::Idle(duration) => BehaviorCommand::Idle { entity, duration },
            ZoneAction::FaceLeft => BehaviorCommand::SetDirection {
                entity,
                direction: -1.0,
            },
            ZoneAction::FaceRight => BehaviorCommand::SetDirection {
                entity,
                direction: 1.0,
            },
            ZoneAction::FlipDirection => BehaviorCommand::FlipDirection { entity },
            ZoneAction::RandomDirection => BehaviorCommand::RandomDirection { entity },
            ZoneAction::Jump => BehaviorCommand::Jump { entity },
        }
    }
}

/// Маска направления движения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub struct ZoneDirections {
    pub left: bool,
    pub right: bool,
}

impl Default for ZoneDirections {
    fn default() -> Self {
        Self::BOTH
    }
}

impl ZoneDirections {
    pub const BOTH: ZoneDirections = ZoneDirections {
        left: true,
        right: true,
    };
    pub const LEFT: ZoneDirections = ZoneDirections {
        left: true,
        right: false,
    };
    pub const RIGHT: ZoneDirections = ZoneDirections {
        left: false,
        right: true,
    };

    /// Обе → всегда; иначе по знаку горизонтальной скорости
    pub fn applies(self, horizontal_velocity: f32) -> bool {
        (self.left && self.right)
            || (self.left && horizontal_velocity < 0.0)
            || (self.right && horizontal_velocity > 0.0)
    }
}

/// Action Zone (immutable после размещения)
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct ActionZone {
    action: ZoneAction,
    state: StateFilter,
    directions: ZoneDirections,
    chance: f32,
}

impl Validate for ActionZone {
    fn validate(&self) -> Result<(), ConfigError> {
        in_range("zone.chance", self.chance, 0.0, 1.0)?;
        if let ZoneAction::Idle(duration) = self.action {
            non_negative("zone.idle_duration", duration)?;
        }
        Ok(())
    }
}

impl ActionZone {
    pub fn new(
        action: ZoneAction,
        state: StateFilter,
        directions: ZoneDirections,
        chance: f32,
    ) -> Result<Self, ConfigError> {
        let zone = Self {
            action,
            state,
            directions,
            chance,
        };
        zone.validate()?;
        Ok(zone)
    }

    pub fn action(&self) -> ZoneAction {
        self.action
    }

    pub fn state(&self) -> StateFilter {
        self.state
    }

    pub fn directions(&self) -> ZoneDirections {
        self.directions
    }

    pub fn chance(&self) -> f32 {
        self.chance
    }

    /// Решение зоны для вошедшего актора
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        state: BehaviorState,
        horizontal_velocity: f32,
        rng: &mut R,
    ) -> Option<ZoneAction> {
        if !self.state.matches(state) {
            return None;
        }
        if self.chance <= 0.0 || rng.gen::<f32>() > self.chance {
            return None;
        }
        if !self.directions.applies(horizontal_velocity) {
            return None;
        }
        Some(self.action)
    }
}

/// Система: Start от зоны → BehaviorCommand (FrameSet::Decide)
pub fn dispatch_zone_actions(
    mut interactions: EventReader<InteractionEvent>,
    zones: Query<&ActionZone>,
    actors: Query<(&Behavior, &Body, Option<&Locomotion>)>,
    mut rng: ResMut<DeterministicRng>,
    mut commands: EventWriter<BehaviorCommand>,
) {
    for event in interactions.read() {
        if event.phase != InteractionPhase::Start {
            continue;
        }
        let Ok(zone) = zones.get(event.source) else {
            continue;
        };
        let Ok((behavior, body, locomotion)) = actors.get(event.target) else {
            continue;
        };

        let horizontal_velocity = locomotion
            .map_or(body.velocity.x, |l| l.axes().horizontal(body.velocity));

        if let Some(action) = zone.evaluate(behavior.state(), horizontal_velocity, &mut rng.rng) {
            crate::logger::log(&format!(
                "Zone {:?} → {:?} for {:?}",
                event.source, action, event.target
            ));
            commands.write(action.command(event.target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn zone(directions: ZoneDirections, chance: f32) -> ActionZone {
        ActionZone::new(ZoneAction::Jump, StateFilter::Any, directions, chance).expect("valid zone")
    }

    #[test]
    fn test_invalid_zone_rejected() {
        assert!(ActionZone::new(ZoneAction::Jump, StateFilter::Any, ZoneDirections::BOTH, 1.5).is_err());
        assert!(ActionZone::new(ZoneAction::Idle(-1.0), StateFilter::Any, ZoneDirections::BOTH, 1.0).is_err());
    }

    #[test]
    fn test_chance_zero_never_executes() {
        let zone = zone(ZoneDirections::BOTH, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..1000 {
            assert_eq!(zone.evaluate(BehaviorState::Patrol, 1.0, &mut rng), None);
        }
    }

    #[test]
    fn test_chance_one_always_executes() {
        let zone = zone(ZoneDirections::BOTH, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..1000 {
            assert_eq!(zone.evaluate(BehaviorState::Patrol, 1.0, &mut rng), Some(ZoneAction::Jump));
        }
    }

    #[test]
    fn test_direction_mask_scenario() {
        let zone = zone(ZoneDirections::LEFT, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(zone.evaluate(BehaviorState::Patrol, -2.0, &mut rng), Some(ZoneAction::Jump));
        assert_eq!(zone.evaluate(BehaviorState::Patrol, 2.0, &mut rng), None);
    }

    #[test]
    fn test_standing_actor_needs_both_directions() {
        assert!(ZoneDirections::BOTH.applies(0.0));
        assert!(!ZoneDirections::LEFT.applies(0.0));
        assert!(!ZoneDirections::RIGHT.applies(0.0));
    }

    #[test]
    fn test_state_filter() {
        let zone = ActionZone::new(
            ZoneAction::FlipDirection,
            StateFilter::Only(BehaviorState::Patrol),
            ZoneDirections::BOTH,
            1.0,
        )
        .expect("valid zone");
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert!(zone.evaluate(BehaviorState::Patrol, 0.0, &mut rng).is_some());
        assert!(zone.evaluate(BehaviorState::Chase, 0.0, &mut rng).is_none());
        assert!(zone.evaluate(BehaviorState::Death, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_actions_map_to_commands() {
        let entity = Entity::from_raw(9);
        assert_eq!(
            ZoneAction::FaceLeft.command(entity),
            BehaviorCommand::SetDirection {
                entity,
                direction: -1.0
            }
        );
        assert_eq!(
            ZoneAction::Idle(2.0).command(entity),
            BehaviorCommand::Idle {
                entity,
                duration: 2.0
            }
        );
    }
}
