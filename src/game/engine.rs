//! Edge-detection engine for extra mid-air jumps

use super::slots::MotionState;
use super::MotionSample;

/// Vertical velocity written on every counted extra jump
pub const EXTRA_JUMP_IMPULSE: f32 = 300.0;

/// What a single evaluation decided for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// On the ground, counter cleared
    Landed,
    /// Normal jump off the ground, left to the host's own jump impulse
    GroundJump,
    /// Airborne press that consumed an extra jump
    ExtraJump { used: u32 },
    /// Airborne press with no extra jumps left
    Exhausted,
    /// Nothing to react to this tick
    Idle,
}

/// Per-tick jump state machine
pub struct JumpSystem;

impl JumpSystem {
    /// Advance one player's motion state by one tick.
    ///
    /// Rules are checked in order, first match wins:
    /// 1. grounded: counter reset, whatever the button does
    /// 2. left the ground on a fresh press: ground jump, not counted
    /// 3. fresh press in the air under the limit: extra jump, counted
    ///
    /// The observed flags are always stored for the next tick's comparison.
    pub fn evaluate(state: &mut MotionState, limit: u32, sample: MotionSample) -> JumpOutcome {
        let press_edge = !state.last_jump_pressed && sample.jump_pressed;

        let outcome = if sample.grounded {
            state.extra_jumps_used = 0;
            JumpOutcome::Landed
        } else if state.last_grounded && press_edge {
            JumpOutcome::GroundJump
        } else if press_edge {
            if state.extra_jumps_used < limit {
                state.extra_jumps_used += 1;
                JumpOutcome::ExtraJump {
                    used: state.extra_jumps_used,
                }
            } else {
                JumpOutcome::Exhausted
            }
        } else {
            JumpOutcome::Idle
        };

        state.last_grounded = sample.grounded;
        state.last_jump_pressed = sample.jump_pressed;

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn air(pressed: bool) -> MotionSample {
        MotionSample::new(false, pressed)
    }

    fn ground(pressed: bool) -> MotionSample {
        MotionSample::new(true, pressed)
    }

    fn airborne_state() -> MotionState {
        MotionState {
            last_grounded: false,
            last_jump_pressed: false,
            extra_jumps_used: 0,
        }
    }

    #[test]
    fn landing_resets_counter_regardless_of_button() {
        for pressed in [false, true] {
            let mut state = MotionState {
                last_grounded: false,
                last_jump_pressed: false,
                extra_jumps_used: 2,
            };

            let outcome = JumpSystem::evaluate(&mut state, 3, ground(pressed));

            assert_eq!(outcome, JumpOutcome::Landed);
            assert_eq!(state.extra_jumps_used, 0);
            assert!(state.last_grounded);
            assert_eq!(state.last_jump_pressed, pressed);
        }
    }

    #[test]
    fn held_button_counts_once() {
        let mut state = airborne_state();

        let outcomes: Vec<JumpOutcome> = [false, true, true, true]
            .into_iter()
            .map(|pressed| JumpSystem::evaluate(&mut state, 3, air(pressed)))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                JumpOutcome::Idle,
                JumpOutcome::ExtraJump { used: 1 },
                JumpOutcome::Idle,
                JumpOutcome::Idle,
            ]
        );
        assert_eq!(state.extra_jumps_used, 1);
    }

    #[test]
    fn limit_is_enforced_until_landing() {
        let mut state = airborne_state();
        let mut impulses = 0;

        for _ in 0..3 {
            JumpSystem::evaluate(&mut state, 2, air(false));
            if let JumpOutcome::ExtraJump { .. } = JumpSystem::evaluate(&mut state, 2, air(true)) {
                impulses += 1;
            }
        }

        assert_eq!(impulses, 2);
        assert_eq!(state.extra_jumps_used, 2);

        JumpSystem::evaluate(&mut state, 2, air(false));
        assert_eq!(
            JumpSystem::evaluate(&mut state, 2, air(true)),
            JumpOutcome::Exhausted
        );
        assert_eq!(state.extra_jumps_used, 2);
    }

    #[test]
    fn ground_jump_is_not_counted() {
        let mut state = MotionState {
            last_grounded: true,
            last_jump_pressed: false,
            extra_jumps_used: 0,
        };

        let outcome = JumpSystem::evaluate(&mut state, 2, air(true));

        assert_eq!(outcome, JumpOutcome::GroundJump);
        assert_eq!(state.extra_jumps_used, 0);
        assert!(!state.last_grounded);
        assert!(state.last_jump_pressed);
    }

    #[test]
    fn ground_jump_press_must_be_released_before_extra_jump() {
        let mut state = MotionState {
            last_grounded: true,
            ..MotionState::default()
        };

        assert_eq!(
            JumpSystem::evaluate(&mut state, 1, air(true)),
            JumpOutcome::GroundJump
        );
        assert_eq!(JumpSystem::evaluate(&mut state, 1, air(true)), JumpOutcome::Idle);
        assert_eq!(JumpSystem::evaluate(&mut state, 1, air(false)), JumpOutcome::Idle);
        assert_eq!(
            JumpSystem::evaluate(&mut state, 1, air(true)),
            JumpOutcome::ExtraJump { used: 1 }
        );
    }

    #[test]
    fn walking_off_a_ledge_then_pressing_is_an_extra_jump() {
        let mut state = MotionState::default();
        JumpSystem::evaluate(&mut state, 1, ground(false));
        assert_eq!(JumpSystem::evaluate(&mut state, 1, air(false)), JumpOutcome::Idle);
        assert_eq!(
            JumpSystem::evaluate(&mut state, 1, air(true)),
            JumpOutcome::ExtraJump { used: 1 }
        );
    }

    #[test]
    fn zero_limit_never_grants_extra_jumps() {
        let mut state = airborne_state();
        assert_eq!(
            JumpSystem::evaluate(&mut state, 0, air(true)),
            JumpOutcome::Exhausted
        );
        assert_eq!(state.extra_jumps_used, 0);
    }

    #[test]
    fn counter_stays_within_limit_for_random_input() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

        for limit in 0..4u32 {
            let mut state = MotionState::default();
            for _ in 0..2_000 {
                let sample = MotionSample::new(rng.gen_bool(0.2), rng.gen_bool(0.5));
                let before = state;
                let outcome = JumpSystem::evaluate(&mut state, limit, sample);

                assert!(state.extra_jumps_used <= limit);
                if sample.grounded {
                    assert_eq!(state.extra_jumps_used, 0);
                }
                if let JumpOutcome::ExtraJump { used } = outcome {
                    assert_eq!(used, state.extra_jumps_used);
                    assert!(!before.last_jump_pressed && sample.jump_pressed);
                    assert_eq!(state.extra_jumps_used, before.extra_jumps_used + 1);
                }
                assert_eq!(state.last_grounded, sample.grounded);
                assert_eq!(state.last_jump_pressed, sample.jump_pressed);
            }
        }
    }
}
