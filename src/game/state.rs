//! Game State Definitions
//!
//! The authoritative match state and the phase-level operations that reset
//! or advance it. Ball resolution lives in [`crate::game::delivery`].
//!
//! Fields are crate-visible only: the presentation layer reads the state
//! through accessors and mutates it exclusively through the operations.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::game::input::HandMove;
use crate::BALLS_PER_OVER;

// =============================================================================
// TEAM
// =============================================================================

/// The two sides of a match.
///
/// India is the human side and always bats first; Pakistan is the
/// computer-controlled side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Human side.
    India,
    /// Computer side.
    Pakistan,
}

impl Team {
    /// The other side.
    #[inline]
    pub fn opponent(self) -> Team {
        match self {
            Team::India => Team::Pakistan,
            Team::Pakistan => Team::India,
        }
    }

    /// Is this the side the human controls?
    #[inline]
    pub fn is_human(self) -> bool {
        matches!(self, Team::India)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::India => f.write_str("India"),
            Team::Pakistan => f.write_str("Pakistan"),
        }
    }
}

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Current phase of the match. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum MatchPhase {
    /// Not playing; initial state.
    #[default]
    Menu,
    /// India batting, Pakistan bowling.
    FirstInnings,
    /// First innings over, target set, waiting for the chase to start.
    InningsBreak,
    /// Pakistan chasing, India bowling.
    SecondInnings,
    /// Result decided.
    MatchOver,
}

impl MatchPhase {
    /// Side batting in this phase, if a ball can be played.
    pub fn batting_team(self) -> Option<Team> {
        match self {
            MatchPhase::FirstInnings => Some(Team::India),
            MatchPhase::SecondInnings => Some(Team::Pakistan),
            MatchPhase::Menu | MatchPhase::InningsBreak | MatchPhase::MatchOver => None,
        }
    }

    /// Can a ball be bowled in this phase?
    #[inline]
    pub fn is_in_play(self) -> bool {
        self.batting_team().is_some()
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchPhase::Menu => "menu",
            MatchPhase::FirstInnings => "1st innings",
            MatchPhase::InningsBreak => "innings break",
            MatchPhase::SecondInnings => "2nd innings",
            MatchPhase::MatchOver => "match over",
        };
        f.write_str(label)
    }
}

// =============================================================================
// BALL OUTCOME
// =============================================================================

/// Identifier of a delivery.
///
/// Monotonic across the whole session (restarts included), so a late
/// enrichment can always tell whether its ball is still the latest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallId(pub u64);

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One resolved delivery.
///
/// Numeric fields are fixed at creation. Only `commentary` may later be
/// replaced, and only through [`MatchState::replace_commentary`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallOutcome {
    /// Delivery identifier
    pub id: BallId,
    /// Side batting
    pub batting: Team,
    /// Side bowling
    pub bowling: Team,
    /// Number shown by the batter
    pub batting_move: HandMove,
    /// Number shown by the bowler
    pub bowling_move: HandMove,
    /// Batter and bowler showed the same number
    pub is_out: bool,
    /// Runs credited: 0 on a dismissal, else the batting number
    pub runs: u32,
    /// Commentary line
    pub commentary: String,
}

// =============================================================================
// VENUE
// =============================================================================

/// Display-only venue annotation attached at match start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Ground name
    pub name: String,
    /// Optional map or info link
    pub link: Option<String>,
}

// =============================================================================
// MATCH RESULT
// =============================================================================

/// How a decided match was won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Margin {
    /// Defending side won by this many runs.
    Runs(u32),
    /// Chasing side reached the target.
    Chased,
}

/// Outcome of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// One side won.
    Won {
        /// Winning side
        winner: Team,
        /// Winning margin
        margin: Margin,
    },
    /// Chasing side dismissed exactly one run short.
    Tie,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Won { winner, margin: Margin::Runs(runs) } => {
                let unit = if *runs == 1 { "run" } else { "runs" };
                write!(f, "{winner} won by {runs} {unit}")
            }
            MatchResult::Won { winner, margin: Margin::Chased } => {
                write!(f, "{winner} won by chasing down the target")
            }
            MatchResult::Tie => f.write_str("Match tied"),
        }
    }
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// Current match phase
    pub(crate) phase: MatchPhase,

    /// India's cumulative runs
    pub(crate) india_score: u32,

    /// Pakistan's cumulative runs
    pub(crate) pakistan_score: u32,

    /// Runs Pakistan must reach; set when the first innings ends
    pub(crate) target: Option<u32>,

    /// Every ball of the current match, oldest first
    pub(crate) history: Vec<BallOutcome>,

    /// Decided winner; stays None on a tie
    pub(crate) winner: Option<Team>,

    /// Most recent ball since the last phase reset
    pub(crate) last_ball: Option<BallOutcome>,

    /// Number of matches started in this session (0 while never started)
    pub(crate) match_number: u32,

    /// Next ball id (monotonic counter, never reset)
    pub(crate) next_ball_id: u64,

    /// Display-only venue annotation
    pub(crate) venue: Option<Venue>,
}

impl MatchState {
    /// Create a fresh state in the menu.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Start a new match: first innings, zeroed scores.
    pub fn start_match(&mut self) {
        self.reset(MatchPhase::FirstInnings);
        self.match_number += 1;
    }

    /// Full reset into a new first innings. Same as [`Self::start_match`].
    pub fn restart_match(&mut self) {
        self.start_match();
    }

    /// Back to the menu with an empty state.
    pub fn return_to_menu(&mut self) {
        self.reset(MatchPhase::Menu);
    }

    /// Begin the chase. Only valid from the innings break.
    ///
    /// Returns false (state unchanged) in any other phase.
    pub fn start_second_innings(&mut self) -> bool {
        if self.phase != MatchPhase::InningsBreak {
            return false;
        }
        self.phase = MatchPhase::SecondInnings;
        self.last_ball = None;
        true
    }

    /// Replace the commentary of the current last ball.
    ///
    /// Ignored (returns false) unless `ball_id` is still the last ball, so a
    /// late update never lands on a newer delivery.
    pub fn replace_commentary(&mut self, ball_id: BallId, text: impl Into<String>) -> bool {
        match self.last_ball.as_mut() {
            Some(ball) if ball.id == ball_id => {
                let text = text.into();
                if let Some(entry) = self.history.iter_mut().rev().find(|b| b.id == ball_id) {
                    entry.commentary = text.clone();
                }
                ball.commentary = text;
                true
            }
            _ => false,
        }
    }

    /// Attach a venue to the match currently identified by `match_number`.
    pub fn set_venue(&mut self, match_number: u32, venue: Venue) -> bool {
        if self.phase == MatchPhase::Menu || self.match_number != match_number {
            return false;
        }
        self.venue = Some(venue);
        true
    }

    fn reset(&mut self, phase: MatchPhase) {
        *self = Self {
            phase,
            match_number: self.match_number,
            next_ball_id: self.next_ball_id,
            ..Self::default()
        };
    }

    /// Allocate the id for the next delivery.
    pub(crate) fn allocate_ball_id(&mut self) -> BallId {
        self.next_ball_id += 1;
        BallId(self.next_ball_id)
    }

    // -------------------------------------------------------------------------
    // Read-only views
    // -------------------------------------------------------------------------

    /// Current phase.
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// India's runs.
    pub fn india_score(&self) -> u32 {
        self.india_score
    }

    /// Pakistan's runs.
    pub fn pakistan_score(&self) -> u32 {
        self.pakistan_score
    }

    /// Runs scored by `team`.
    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::India => self.india_score,
            Team::Pakistan => self.pakistan_score,
        }
    }

    /// Chase target, once the first innings has ended.
    pub fn target(&self) -> Option<u32> {
        self.target
    }

    /// Balls of the current match, oldest first.
    pub fn history(&self) -> &[BallOutcome] {
        &self.history
    }

    /// Decided winner (None while undecided and for a tie).
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Most recent ball since the last phase change.
    pub fn last_ball(&self) -> Option<&BallOutcome> {
        self.last_ball.as_ref()
    }

    /// Match counter for this session.
    pub fn match_number(&self) -> u32 {
        self.match_number
    }

    /// Venue annotation, if one was found.
    pub fn venue(&self) -> Option<&Venue> {
        self.venue.as_ref()
    }

    /// Side currently batting.
    pub fn batting_team(&self) -> Option<Team> {
        self.phase.batting_team()
    }

    /// Side currently bowling.
    pub fn bowling_team(&self) -> Option<Team> {
        self.batting_team().map(Team::opponent)
    }

    /// Runs Pakistan still need (saturating at 0).
    pub fn runs_needed(&self) -> Option<u32> {
        self.target.map(|t| t.saturating_sub(self.pakistan_score))
    }

    /// Balls bowled in the current innings, or in the innings that just
    /// ended while the phase is out of play.
    pub fn balls_in_innings(&self) -> usize {
        let team = self
            .batting_team()
            .or_else(|| self.last_ball.as_ref().map(|b| b.batting));
        match team {
            Some(team) => self.history.iter().filter(|b| b.batting == team).count(),
            None => 0,
        }
    }

    /// Overs of the current innings as `(completed overs, balls)`.
    pub fn overs(&self) -> (usize, usize) {
        let balls = self.balls_in_innings();
        (balls / BALLS_PER_OVER, balls % BALLS_PER_OVER)
    }

    /// Is the match decided?
    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::MatchOver
    }

    /// Final result, once the match is over.
    pub fn result(&self) -> Option<MatchResult> {
        if !self.is_over() {
            return None;
        }
        let target = self.target?;
        Some(match self.winner {
            Some(Team::Pakistan) => MatchResult::Won {
                winner: Team::Pakistan,
                margin: Margin::Chased,
            },
            Some(Team::India) => MatchResult::Won {
                winner: Team::India,
                margin: Margin::Runs(target.saturating_sub(1).saturating_sub(self.pakistan_score)),
            },
            None => MatchResult::Tie,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(id: u64, batting: Team) -> BallOutcome {
        BallOutcome {
            id: BallId(id),
            batting,
            bowling: batting.opponent(),
            batting_move: HandMove::new(4).unwrap(),
            bowling_move: HandMove::new(2).unwrap(),
            is_out: false,
            runs: 4,
            commentary: "local".to_string(),
        }
    }

    #[test]
    fn test_initial_state_is_menu() {
        let state = MatchState::new();
        assert_eq!(state.phase(), MatchPhase::Menu);
        assert_eq!(state.india_score(), 0);
        assert_eq!(state.target(), None);
        assert!(state.history().is_empty());
        assert_eq!(state.winner(), None);
        assert!(state.last_ball().is_none());
    }

    #[test]
    fn test_start_match_resets() {
        let mut state = MatchState::new();
        state.india_score = 40;
        state.target = Some(41);
        state.history.push(ball(1, Team::India));
        state.next_ball_id = 1;

        state.start_match();

        assert_eq!(state.phase(), MatchPhase::FirstInnings);
        assert_eq!(state.india_score(), 0);
        assert_eq!(state.target(), None);
        assert!(state.history().is_empty());
        assert_eq!(state.match_number(), 1);
        // Ball ids keep counting across matches
        assert_eq!(state.allocate_ball_id(), BallId(2));
    }

    #[test]
    fn test_return_to_menu() {
        let mut state = MatchState::new();
        state.start_match();
        state.india_score = 12;
        state.return_to_menu();

        assert_eq!(state.phase(), MatchPhase::Menu);
        assert_eq!(state.india_score(), 0);
        assert_eq!(state.match_number(), 1);
    }

    #[test]
    fn test_second_innings_only_from_break() {
        let mut state = MatchState::new();
        assert!(!state.start_second_innings());

        state.start_match();
        assert!(!state.start_second_innings());
        assert_eq!(state.phase(), MatchPhase::FirstInnings);

        state.phase = MatchPhase::InningsBreak;
        state.india_score = 30;
        state.target = Some(31);
        state.last_ball = Some(ball(5, Team::India));

        assert!(state.start_second_innings());
        assert_eq!(state.phase(), MatchPhase::SecondInnings);
        assert!(state.last_ball().is_none());
        assert_eq!(state.india_score(), 30);
        assert_eq!(state.target(), Some(31));
    }

    #[test]
    fn test_replace_commentary_only_for_latest() {
        let mut state = MatchState::new();
        state.start_match();
        let first = ball(1, Team::India);
        let second = ball(2, Team::India);
        state.history.push(first);
        state.history.push(second.clone());
        state.last_ball = Some(second);

        assert!(!state.replace_commentary(BallId(1), "stale"));
        assert_eq!(state.history()[0].commentary, "local");

        assert!(state.replace_commentary(BallId(2), "fresh"));
        assert_eq!(state.last_ball().unwrap().commentary, "fresh");
        assert_eq!(state.history()[1].commentary, "fresh");
        assert_eq!(state.last_ball().unwrap().runs, 4);
    }

    #[test]
    fn test_set_venue_checks_match_number() {
        let venue = Venue { name: "Eden Gardens".into(), link: None };
        let mut state = MatchState::new();
        assert!(!state.set_venue(0, venue.clone()));

        state.start_match();
        assert!(!state.set_venue(0, venue.clone()));
        assert!(state.set_venue(1, venue.clone()));
        assert_eq!(state.venue(), Some(&venue));

        state.restart_match();
        assert_eq!(state.venue(), None);
    }

    #[test]
    fn test_overs() {
        let mut state = MatchState::new();
        state.start_match();
        for i in 0..8 {
            state.history.push(ball(i, Team::India));
        }
        assert_eq!(state.overs(), (1, 2));
    }

    #[test]
    fn test_overs_kept_after_innings_ends() {
        let mut state = MatchState::new();
        state.start_match();
        for i in 0..7 {
            state.history.push(ball(i, Team::India));
        }
        state.last_ball = state.history.last().cloned();
        state.phase = MatchPhase::InningsBreak;
        assert_eq!(state.overs(), (1, 1));

        assert!(state.start_second_innings());
        assert_eq!(state.overs(), (0, 0));

        for i in 7..10 {
            state.history.push(ball(i, Team::Pakistan));
        }
        state.last_ball = state.history.last().cloned();
        state.phase = MatchPhase::MatchOver;
        assert_eq!(state.overs(), (0, 3));

        state.return_to_menu();
        assert_eq!(state.overs(), (0, 0));
    }

    #[test]
    fn test_result_margins() {
        let mut state = MatchState::new();
        state.phase = MatchPhase::MatchOver;
        state.target = Some(50);
        state.pakistan_score = 45;
        state.winner = Some(Team::India);
        assert_eq!(
            state.result(),
            Some(MatchResult::Won { winner: Team::India, margin: Margin::Runs(4) })
        );

        state.winner = None;
        state.pakistan_score = 49;
        assert_eq!(state.result(), Some(MatchResult::Tie));
        assert_eq!(state.result().unwrap().to_string(), "Match tied");
    }

    #[test]
    fn test_phase_batting_sides() {
        assert_eq!(MatchPhase::FirstInnings.batting_team(), Some(Team::India));
        assert_eq!(MatchPhase::SecondInnings.batting_team(), Some(Team::Pakistan));
        assert!(!MatchPhase::InningsBreak.is_in_play());
        assert!(!MatchPhase::Menu.is_in_play());
        assert!(!MatchPhase::MatchOver.is_in_play());
    }
}
