//! Tests for Behavior FSM (чистые переходы, без App)

#[cfg(test)]
mod tests {
    use super::super::behavior::*;
    use crate::components::Facing;
    use bevy::prelude::{Entity, Timer};
    use std::time::Duration;

    fn behavior() -> Behavior {
        Behavior::new(BehaviorConfig::default()).expect("default config is valid")
    }

    fn with_target() -> Behavior {
        let mut behavior = behavior();
        behavior.set_target(Some(Entity::from_raw(42)));
        behavior
    }

    #[test]
    fn test_initial_state_patrol() {
        let behavior = behavior();
        assert_eq!(behavior.state(), BehaviorState::Patrol);
        assert_eq!(behavior.config().initial_facing, Facing::Right);
        assert_eq!(behavior.target(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BehaviorConfig {
            attack_range: -1.0,
            ..Default::default()
        };
        assert!(Behavior::new(config).is_err());
    }

    #[test]
    fn test_faces_target() {
        let mut behavior = with_target();

        let left = behavior.decide(-3.0, 3.0, 0.1).expect("engaged");
        assert_eq!(left.direction, -1.0);

        let right = behavior.decide(3.0, 3.0, 0.1).expect("engaged");
        assert_eq!(right.direction, 1.0);
        assert_eq!(behavior.state(), BehaviorState::Chase);
    }

    #[test]
    fn test_attack_in_range_is_rate_limited() {
        let mut behavior = with_target();

        let first = behavior.decide(0.5, 0.5, 0.1).expect("engaged");
        assert!(first.attack);
        assert_eq!(behavior.state(), BehaviorState::Attack);

        // attack_interval 0.5 → следующий кадр без атаки
        let second = behavior.decide(0.5, 0.5, 0.1).expect("engaged");
        assert!(!second.attack);

        let mut attacked = false;
        for _ in 0..5 {
            attacked |= behavior.decide(0.5, 0.5, 0.1).expect("engaged").attack;
        }
        assert!(attacked);
    }

    #[test]
    fn test_lost_target_returns_to_patrol() {
        let mut behavior = with_target();
        behavior.decide(5.0, 5.0, 0.1);
        assert_eq!(behavior.state(), BehaviorState::Chase);

        behavior.set_target(None);
        assert_eq!(behavior.state(), BehaviorState::Patrol);
        assert_eq!(behavior.decide(5.0, 5.0, 0.1), None);
    }

    #[test]
    fn test_idle_blocks_target_branch() {
        let mut behavior = with_target();
        assert!(behavior.enter_idle());
        assert_eq!(behavior.state(), BehaviorState::Idle);
        assert_eq!(behavior.decide(0.5, 0.5, 0.1), None);

        assert!(behavior.resume_patrol());
        assert_eq!(behavior.state(), BehaviorState::Patrol);
        assert!(behavior.decide(0.5, 0.5, 0.1).is_some());
    }

    #[test]
    fn test_death_is_terminal() {
        let mut behavior = with_target();
        assert!(behavior.die());
        assert!(!behavior.die());

        assert_eq!(behavior.state(), BehaviorState::Death);
        assert!(!behavior.enter_idle());
        assert!(!behavior.resume_patrol());

        behavior.set_target(Some(Entity::from_raw(1)));
        assert_eq!(behavior.target(), None);
        assert_eq!(behavior.decide(0.1, 0.1, 0.1), None);
        assert_eq!(behavior.state(), BehaviorState::Death);
    }

    #[test]
    fn test_idle_timer_resumes_no_earlier_than_duration() {
        let mut timer = IdleTimer::new(1.0);

        timer.0.tick(Duration::from_millis(600));
        assert!(!timer.0.finished());

        timer.0.tick(Duration::from_millis(399));
        assert!(!timer.0.finished());

        timer.0.tick(Duration::from_millis(1));
        assert!(timer.0.finished());
    }

    #[test]
    fn test_negative_idle_duration_clamped() {
        let timer = IdleTimer::new(-3.0);
        assert_eq!(timer.0.duration(), Timer::from_seconds(0.0, bevy::prelude::TimerMode::Once).duration());
    }

    #[test]
    fn test_state_filter() {
        assert!(StateFilter::Any.matches(BehaviorState::Death));
        assert!(StateFilter::Only(BehaviorState::Patrol).matches(BehaviorState::Patrol));
        assert!(!StateFilter::Only(BehaviorState::Patrol).matches(BehaviorState::Chase));
    }
}
