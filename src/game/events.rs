//! Game Events
//!
//! Events generated by match operations, for logging and for deciding which
//! optional enrichment a ball deserves.

use serde::{Serialize, Deserialize};

use crate::game::state::{BallId, MatchPhase, Team};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A ball was resolved
    BallBowled {
        batting: Team,
        runs: u32,
        is_out: bool,
    },

    /// First innings ended; chase target fixed
    InningsEnded {
        batting: Team,
        total: u32,
        target: u32,
    },

    /// Match phase changed
    PhaseChanged {
        old_phase: MatchPhase,
        new_phase: MatchPhase,
    },

    /// Match decided (None = tie)
    MatchEnded {
        winner: Option<Team>,
    },
}

/// A game event, tagged with the ball that caused it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Ball that triggered the event (None for operations without a ball)
    pub ball_id: Option<BallId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(ball_id: Option<BallId>, data: GameEventData) -> Self {
        Self { ball_id, data }
    }

    /// Create ball bowled event.
    pub fn ball_bowled(ball_id: BallId, batting: Team, runs: u32, is_out: bool) -> Self {
        Self::new(Some(ball_id), GameEventData::BallBowled { batting, runs, is_out })
    }

    /// Create innings ended event.
    pub fn innings_ended(ball_id: BallId, batting: Team, total: u32, target: u32) -> Self {
        Self::new(Some(ball_id), GameEventData::InningsEnded { batting, total, target })
    }

    /// Create phase changed event.
    pub fn phase_changed(ball_id: Option<BallId>, old_phase: MatchPhase, new_phase: MatchPhase) -> Self {
        Self::new(ball_id, GameEventData::PhaseChanged { old_phase, new_phase })
    }

    /// Create match ended event.
    pub fn match_ended(ball_id: BallId, winner: Option<Team>) -> Self {
        Self::new(Some(ball_id), GameEventData::MatchEnded { winner })
    }

    /// Is this a headline moment (wicket or six) worth a spoken call?
    pub fn is_highlight(&self) -> bool {
        matches!(
            self.data,
            GameEventData::BallBowled { is_out: true, .. } | GameEventData::BallBowled { runs: 6, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlights() {
        assert!(GameEvent::ball_bowled(BallId(1), Team::India, 0, true).is_highlight());
        assert!(GameEvent::ball_bowled(BallId(2), Team::India, 6, false).is_highlight());
        assert!(!GameEvent::ball_bowled(BallId(3), Team::India, 4, false).is_highlight());
        assert!(!GameEvent::match_ended(BallId(4), None).is_highlight());
    }
}
