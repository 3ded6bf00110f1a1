//! Computer Opponent
//!
//! Picks the computer side's number for a ball. The pick is deliberately
//! biased: India's innings is capped below a soft ceiling and the chase is
//! steered so Pakistan can never reach the target.
//!
//! ## Policy
//!
//! A uniform candidate in 1..=6 is always drawn first, then:
//!
//! - **India batting** (computer bowls)
//!   - score >= `ceiling_certain`: bowl the human's number (certain wicket)
//!   - score >= `ceiling_pressure`: same, with a chance escalating per run
//!   - candidate equals the human's number by accident: replace it with a
//!     different number, very likely early and less likely later; from
//!     `ceiling_pressure` on no protection is given
//! - **Pakistan batting** (computer bats, human bowls)
//!   - runs needed <= `kill_switch_runs`: bat the human's number (certain wicket)
//!   - runs needed <= `tension_max_runs`: same with `tension_percent`
//!   - otherwise: same with `early_strike_percent`

use serde::{Serialize, Deserialize};

use crate::core::rng::RandomSource;
use crate::game::input::HandMove;
use crate::game::state::{MatchState, Team};

/// Tunable constants of the opponent policy.
///
/// These are fixed product constants; `Default` is the shipped policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentPolicy {
    /// India score from which a wicket is forced every ball.
    pub ceiling_certain: u32,
    /// India score from which wickets are forced probabilistically.
    pub ceiling_pressure: u32,
    /// Forcing chance (percent) at exactly `ceiling_pressure`.
    pub pressure_base_percent: u32,
    /// Extra forcing chance (percent) per run above `ceiling_pressure`.
    pub pressure_step_percent: u32,
    /// Below this score accidental wickets are very likely overridden.
    pub early_protection_below: u32,
    /// Override chance (percent) below `early_protection_below`.
    pub early_protection_percent: u32,
    /// Override chance (percent) from `early_protection_below` up to
    /// `ceiling_pressure`.
    pub late_protection_percent: u32,
    /// Runs-needed band where the chasing side is always dismissed.
    pub kill_switch_runs: u32,
    /// Upper bound of the coin-flip band.
    pub tension_max_runs: u32,
    /// Forcing chance (percent) inside the coin-flip band.
    pub tension_percent: u32,
    /// Forcing chance (percent) with many runs still needed.
    pub early_strike_percent: u32,
}

impl Default for OpponentPolicy {
    fn default() -> Self {
        Self {
            ceiling_certain: 95,
            ceiling_pressure: 85,
            pressure_base_percent: 40,
            pressure_step_percent: 6,
            early_protection_below: 40,
            early_protection_percent: 95,
            late_protection_percent: 70,
            kill_switch_runs: 6,
            tension_max_runs: 15,
            tension_percent: 50,
            early_strike_percent: 10,
        }
    }
}

impl OpponentPolicy {
    /// Chance (percent) of forcing a wicket on India at `score`.
    pub fn ceiling_percent(&self, score: u32) -> u32 {
        if score >= self.ceiling_certain {
            100
        } else if score >= self.ceiling_pressure {
            let above = score - self.ceiling_pressure;
            (self.pressure_base_percent + above * self.pressure_step_percent).min(100)
        } else {
            0
        }
    }

    /// Chance (percent) of overriding an accidental wicket on India at `score`.
    pub fn protection_percent(&self, score: u32) -> u32 {
        if score < self.early_protection_below {
            self.early_protection_percent
        } else if score < self.ceiling_pressure {
            self.late_protection_percent
        } else {
            0
        }
    }

    /// Chance (percent) of dismissing the chasing side with `runs_needed`.
    pub fn chase_strike_percent(&self, runs_needed: u32) -> u32 {
        if runs_needed <= self.kill_switch_runs {
            100
        } else if runs_needed <= self.tension_max_runs {
            self.tension_percent
        } else {
            self.early_strike_percent
        }
    }
}

/// Match context the opponent sees for one ball.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveContext {
    /// Side batting this ball
    pub batting: Team,
    /// India's runs before the ball
    pub india_score: u32,
    /// Pakistan's runs before the ball
    pub pakistan_score: u32,
    /// Chase target, if set
    pub target: Option<u32>,
}

impl MoveContext {
    /// Context for the next ball of `state`, if a ball can be played.
    pub fn from_state(state: &MatchState) -> Option<Self> {
        Some(Self {
            batting: state.batting_team()?,
            india_score: state.india_score(),
            pakistan_score: state.pakistan_score(),
            target: state.target(),
        })
    }
}

/// Why the opponent picked its number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Random candidate kept.
    Candidate,
    /// India near the ceiling; wicket forced.
    CeilingForced,
    /// Accidental wicket on India overridden.
    Protected,
    /// Chase inside the kill-switch band; wicket forced.
    KillSwitch,
    /// Chase inside the coin-flip band; wicket forced.
    Tension,
    /// Early chase; occasional forced wicket.
    EarlyStrike,
}

/// Pick the opponent's number and report why.
pub fn decide<R: RandomSource + ?Sized>(
    human: HandMove,
    ctx: &MoveContext,
    policy: &OpponentPolicy,
    rng: &mut R,
) -> (HandMove, Decision) {
    let candidate = HandMove::new(rng.roll_die()).unwrap_or(human.next_wrapping());

    let picked = match ctx.batting {
        Team::India => {
            let score = ctx.india_score;
            if rng.chance(policy.ceiling_percent(score)) {
                (human, Decision::CeilingForced)
            } else if candidate == human && rng.chance(policy.protection_percent(score)) {
                (human.next_wrapping(), Decision::Protected)
            } else {
                (candidate, Decision::Candidate)
            }
        }
        Team::Pakistan => match ctx.target {
            Some(target) => {
                let runs_needed = target.saturating_sub(ctx.pakistan_score);
                let decision = if runs_needed <= policy.kill_switch_runs {
                    Decision::KillSwitch
                } else if runs_needed <= policy.tension_max_runs {
                    Decision::Tension
                } else {
                    Decision::EarlyStrike
                };
                if rng.chance(policy.chase_strike_percent(runs_needed)) {
                    (human, decision)
                } else {
                    (candidate, Decision::Candidate)
                }
            }
            None => (candidate, Decision::Candidate),
        },
    };

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        human = human.value(),
        candidate = candidate.value(),
        picked = picked.0.value(),
        decision = ?picked.1,
        batting = %ctx.batting,
        "opponent move"
    );

    picked
}

/// Pick the opponent's number for one ball.
///
/// Pure apart from draws on `rng`.
pub fn compute_opponent_move<R: RandomSource + ?Sized>(
    human: HandMove,
    ctx: &MoveContext,
    policy: &OpponentPolicy,
    rng: &mut R,
) -> HandMove {
    decide(human, ctx, policy, rng).0
}

// =============================================================================
// TESTS
// =============================================================================
