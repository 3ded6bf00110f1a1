//! Ball Resolution
//!
//! Plays one ball against the match state: picks the opponent's number,
//! decides the outcome, credits runs, and drives the phase transitions.
//!
//! ```text
//! FirstInnings  --not out-->                 FirstInnings
//! FirstInnings  --out-->                     InningsBreak (target = india + 1)
//! SecondInnings --score >= target-->         MatchOver (Pakistan)
//! SecondInnings --out, score <  target - 1-> MatchOver (India)
//! SecondInnings --out, score == target - 1-> MatchOver (tie)
//! ```
//!
//! Reaching the target is checked before the dismissal.

use crate::core::rng::RandomSource;
use crate::game::commentary::local_commentary;
use crate::game::events::GameEvent;
use crate::game::input::HandMove;
use crate::game::opponent::{decide, Decision, MoveContext, OpponentPolicy};
use crate::game::state::{BallOutcome, MatchPhase, MatchState, Team};

/// Result of playing one ball.
#[derive(Debug, Default)]
pub struct DeliveryResult {
    /// The resolved ball (None if the phase allows no ball)
    pub ball: Option<BallOutcome>,
    /// Why the opponent picked its number
    pub decision: Option<Decision>,
    /// Events generated by this ball
    pub events: Vec<GameEvent>,
}

impl DeliveryResult {
    /// Was a ball actually played?
    pub fn played(&self) -> bool {
        self.ball.is_some()
    }
}

/// Play one ball with the human's number.
///
/// No-op outside the two innings: the state is left untouched and an empty
/// result is returned.
///
/// `rng` drives the opponent; `flavor_rng` only picks commentary, so text
/// choices never shift the opponent's sequence.
pub fn play_ball<R, F>(
    state: &mut MatchState,
    human: HandMove,
    policy: &OpponentPolicy,
    rng: &mut R,
    flavor_rng: &mut F,
) -> DeliveryResult
where
    R: RandomSource + ?Sized,
    F: RandomSource + ?Sized,
{
    let mut result = DeliveryResult::default();

    // 1. Roles from phase
    let Some(ctx) = MoveContext::from_state(state) else {
        return result;
    };
    let batting = ctx.batting;
    let bowling = batting.opponent();

    // 2. Opponent's number
    let (opponent, decision) = decide(human, &ctx, policy, rng);
    let (batting_move, bowling_move) = if batting.is_human() {
        (human, opponent)
    } else {
        (opponent, human)
    };

    // 3. Outcome
    let is_out = batting_move == bowling_move;
    let runs = if is_out { 0 } else { u32::from(batting_move.value()) };

    // 4. Ball record
    let id = state.allocate_ball_id();
    let ball = BallOutcome {
        id,
        batting,
        bowling,
        batting_move,
        bowling_move,
        is_out,
        runs,
        commentary: local_commentary(flavor_rng, is_out, runs),
    };
    result.events.push(GameEvent::ball_bowled(id, batting, runs, is_out));

    // 5. Score
    if !is_out {
        match batting {
            Team::India => state.india_score += runs,
            Team::Pakistan => state.pakistan_score += runs,
        }
    }

    // 6. Phase transition
    apply_transition(state, &ball, &mut result.events);

    // 7. History
    state.history.push(ball.clone());
    state.last_ball = Some(ball.clone());

    result.ball = Some(ball);
    result.decision = Some(decision);
    result
}

/// Move the phase on after a ball.
fn apply_transition(state: &mut MatchState, ball: &BallOutcome, events: &mut Vec<GameEvent>) {
    let old_phase = state.phase;

    match old_phase {
        MatchPhase::FirstInnings => {
            if ball.is_out {
                let target = state.india_score + 1;
                state.target = Some(target);
                state.phase = MatchPhase::InningsBreak;
                events.push(GameEvent::innings_ended(ball.id, ball.batting, state.india_score, target));
            }
        }
        MatchPhase::SecondInnings => {
            // Target is always set once the chase is on
            let target = state.target.unwrap_or(0);
            let score = state.pakistan_score;

            let decided = if score >= target {
                Some(Some(ball.batting))
            } else if ball.is_out {
                if score + 1 == target {
                    Some(None)
                } else {
                    Some(Some(ball.bowling))
                }
            } else {
                None
            };

            if let Some(winner) = decided {
                state.phase = MatchPhase::MatchOver;
                state.winner = winner;
                events.push(GameEvent::match_ended(ball.id, winner));
            }
        }
        MatchPhase::Menu | MatchPhase::InningsBreak | MatchPhase::MatchOver => {}
    }

    if state.phase != old_phase {
        events.push(GameEvent::phase_changed(Some(ball.id), old_phase, state.phase));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{DeterministicRng, ScriptedRng};
    use crate::game::events::GameEventData;
    use crate::game::state::BallId;
    use proptest::prelude::*;

    fn hand(v: u8) -> HandMove {
        HandMove::new(v).unwrap()
    }

    fn play(state: &mut MatchState, human: u8, rng: &mut ScriptedRng) -> DeliveryResult {
        let mut flavor = ScriptedRng::new();
        play_ball(state, hand(human), &OpponentPolicy::default(), rng, &mut flavor)
    }

    /// State in the chase with the given target and Pakistan score.
    fn chasing(target: u32, pakistan: u32) -> MatchState {
        let mut state = MatchState::new();
        state.start_match();
        state.india_score = target - 1;
        state.target = Some(target);
        state.phase = MatchPhase::InningsBreak;
        assert!(state.start_second_innings());
        state.pakistan_score = pakistan;
        state
    }

    #[test]
    fn test_noop_outside_innings() {
        let policy = OpponentPolicy::default();
        let mut rng = DeterministicRng::new(1);
        let mut flavor = DeterministicRng::new(2);

        let mut state = MatchState::new();
        let before = state.clone();
        assert!(!play_ball(&mut state, hand(3), &policy, &mut rng, &mut flavor).played());
        assert_eq!(state, before);

        state.start_match();
        state.phase = MatchPhase::InningsBreak;
        let before = state.clone();
        assert!(!play_ball(&mut state, hand(3), &policy, &mut rng, &mut flavor).played());
        assert_eq!(state, before);

        state.phase = MatchPhase::MatchOver;
        let before = state.clone();
        assert!(!play_ball(&mut state, hand(3), &policy, &mut rng, &mut flavor).played());
        assert_eq!(state, before);
    }

    #[test]
    fn test_first_ball_scores() {
        let mut state = MatchState::new();
        state.start_match();
        let mut rng = ScriptedRng::new().with_dice([1]);

        let result = play(&mut state, 3, &mut rng);
        let ball = result.ball.unwrap();

        assert!(!ball.is_out);
        assert_eq!(ball.runs, 3);
        assert_eq!(ball.batting, Team::India);
        assert_eq!(ball.bowling_move, hand(1));
        assert_eq!(state.india_score(), 3);
        assert_eq!(state.phase(), MatchPhase::FirstInnings);
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.last_ball(), Some(&ball));
    }

    #[test]
    fn test_accidental_match_protected_early() {
        let mut state = MatchState::new();
        state.start_match();
        let mut rng = ScriptedRng::new().with_dice([3]).with_coins([true]);

        let result = play(&mut state, 3, &mut rng);
        assert_eq!(result.decision, Some(Decision::Protected));
        assert_eq!(state.india_score(), 3);
    }

    #[test]
    fn test_ceiling_ends_first_innings() {
        let mut state = MatchState::new();
        state.start_match();

        // 16 sixes to 96, opponent always bowls 1
        let mut rng = ScriptedRng::new().with_dice(std::iter::repeat(1).take(16));
        for _ in 0..16 {
            play(&mut state, 6, &mut rng);
        }
        assert_eq!(state.india_score(), 96);
        assert_eq!(state.target(), None);

        let result = play(&mut state, 6, &mut rng);
        let ball = result.ball.unwrap();
        assert!(ball.is_out);
        assert_eq!(ball.runs, 0);
        assert_eq!(result.decision, Some(Decision::CeilingForced));
        assert_eq!(state.phase(), MatchPhase::InningsBreak);
        assert_eq!(state.target(), Some(97));
        assert_eq!(state.history().len(), 17);

        assert!(result.events.iter().any(|e| matches!(
            e.data,
            GameEventData::InningsEnded { total: 96, target: 97, .. }
        )));
    }

    #[test]
    fn test_second_innings_start_keeps_scores() {
        let mut state = MatchState::new();
        state.start_match();
        let mut rng = ScriptedRng::new().with_dice([2, 4]).with_coins([false]);
        play(&mut state, 5, &mut rng);
        // Accidental match, protection coin fails
        play(&mut state, 4, &mut rng);
        assert_eq!(state.phase(), MatchPhase::InningsBreak);
        assert_eq!(state.target(), Some(6));

        assert!(state.start_second_innings());
        assert_eq!(state.phase(), MatchPhase::SecondInnings);
        assert!(state.last_ball().is_none());
        assert_eq!(state.india_score(), 5);
        assert_eq!(state.pakistan_score(), 0);
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_kill_switch_defends_target() {
        let mut state = chasing(50, 45);
        let mut rng = ScriptedRng::new().with_dice([6]);

        let result = play(&mut state, 2, &mut rng);
        let ball = result.ball.unwrap();
        assert!(ball.is_out);
        assert_eq!(ball.batting, Team::Pakistan);
        assert_eq!(ball.batting_move, hand(2));
        assert_eq!(state.phase(), MatchPhase::MatchOver);
        assert_eq!(state.winner(), Some(Team::India));
        assert_eq!(state.pakistan_score(), 45);
    }

    #[test]
    fn test_tie_at_target_minus_one() {
        let mut state = chasing(50, 49);
        let mut rng = ScriptedRng::new();

        let result = play(&mut state, 4, &mut rng);
        assert!(result.ball.unwrap().is_out);
        assert_eq!(state.phase(), MatchPhase::MatchOver);
        assert_eq!(state.winner(), None);
        assert!(result.events.iter().any(|e| e.data == GameEventData::MatchEnded { winner: None }));
    }

    #[test]
    fn test_chasing_side_wins_on_target() {
        // Early band with a permissive policy so Pakistan can score
        let policy = OpponentPolicy {
            kill_switch_runs: 0,
            tension_max_runs: 0,
            early_strike_percent: 0,
            ..OpponentPolicy::default()
        };
        let mut state = chasing(10, 5);
        let mut rng = ScriptedRng::new().with_dice([6]);
        let mut flavor = ScriptedRng::new();

        let result = play_ball(&mut state, hand(1), &policy, &mut rng, &mut flavor);
        assert_eq!(result.ball.unwrap().runs, 6);
        assert_eq!(state.pakistan_score(), 11);
        assert_eq!(state.phase(), MatchPhase::MatchOver);
        assert_eq!(state.winner(), Some(Team::Pakistan));
    }

    #[test]
    fn test_chase_continues_when_not_out() {
        let mut state = chasing(80, 10);
        let mut rng = ScriptedRng::new().with_dice([3]).with_coins([false]);

        play(&mut state, 1, &mut rng);
        assert_eq!(state.pakistan_score(), 13);
        assert_eq!(state.phase(), MatchPhase::SecondInnings);
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_ball_ids_monotonic_across_restart() {
        let mut state = MatchState::new();
        state.start_match();
        let mut rng = ScriptedRng::new().with_dice([1, 1]);
        let first = play(&mut state, 2, &mut rng).ball.unwrap().id;

        state.restart_match();
        let second = play(&mut state, 2, &mut rng).ball.unwrap().id;
        assert!(second > first);
        assert_eq!(state.history().len(), 1);
        assert_eq!(second, BallId(2));
    }

    #[test]
    fn test_phase_events_emitted() {
        let mut state = chasing(50, 45);
        let mut rng = ScriptedRng::new();
        let result = play(&mut state, 2, &mut rng);

        assert!(result.events.iter().any(|e| e.data == GameEventData::PhaseChanged {
            old_phase: MatchPhase::SecondInnings,
            new_phase: MatchPhase::MatchOver,
        }));
    }

    /// Drive a whole match with fixed human input, checking invariants per ball.
    fn run_match(seed: u64, moves: &[u8]) -> MatchState {
        let policy = OpponentPolicy::default();
        let mut rng = DeterministicRng::new(seed);
        let mut flavor = DeterministicRng::new(seed ^ 0xFF);
        let mut state = MatchState::new();
        state.start_match();

        let mut i = 0usize;
        for _ in 0..2_000 {
            match state.phase() {
                MatchPhase::InningsBreak => {
                    assert!(state.start_second_innings());
                    continue;
                }
                MatchPhase::MatchOver => break,
                _ => {}
            }

            let before = state.clone();
            let human = hand(moves[i % moves.len()]);
            i += 1;
            let ball = play_ball(&mut state, human, &policy, &mut rng, &mut flavor)
                .ball
                .expect("ball in play");

            assert_eq!(ball.is_out, ball.batting_move == ball.bowling_move);
            if ball.is_out {
                assert_eq!(ball.runs, 0);
            }
            assert_eq!(state.history().len(), before.history().len() + 1);
            assert!(state.india_score() >= before.india_score());
            assert!(state.pakistan_score() >= before.pakistan_score());
            if state.phase() == MatchPhase::FirstInnings {
                assert_eq!(state.target(), None);
            }
            if before.target().is_some() {
                assert_eq!(state.target(), before.target());
            }
            if state.phase() != MatchPhase::MatchOver {
                assert_eq!(state.winner(), None);
            }
        }
        state
    }

    proptest! {
        #[test]
        fn prop_match_invariants(
            seed in any::<u64>(),
            moves in proptest::collection::vec(1u8..=6, 1..12),
        ) {
            let state = run_match(seed, &moves);

            prop_assert_eq!(state.phase(), MatchPhase::MatchOver);
            prop_assert!(state.india_score() <= 100);

            let target = state.target().expect("target set");
            prop_assert_eq!(target, state.india_score() + 1);

            let sum: u32 = state.history().iter()
                .filter(|b| b.batting == Team::India)
                .map(|b| b.runs)
                .sum();
            prop_assert_eq!(sum, state.india_score());

            match state.winner() {
                Some(Team::India) => prop_assert!(state.pakistan_score() + 1 < target),
                Some(Team::Pakistan) => prop_assert!(state.pakistan_score() >= target),
                None => prop_assert_eq!(state.pakistan_score() + 1, target),
            }
        }

        #[test]
        fn prop_ceiling_with_constant_six(seed in any::<u64>()) {
            let policy = OpponentPolicy::default();
            let mut rng = DeterministicRng::new(seed);
            let mut flavor = DeterministicRng::new(seed);
            let mut state = MatchState::new();
            state.start_match();

            while state.phase() == MatchPhase::FirstInnings {
                play_ball(&mut state, hand(6), &policy, &mut rng, &mut flavor);
                prop_assert!(state.india_score() <= 100);
            }
            prop_assert_eq!(state.phase(), MatchPhase::InningsBreak);
        }
    }
}
