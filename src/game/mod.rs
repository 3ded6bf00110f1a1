//! Game Logic Module
//!
//! The synchronous match engine. No I/O, no async, no global state: every
//! random draw comes from a caller-supplied [`crate::core::RandomSource`].
//!
//! ## Module Structure
//!
//! - `input`: validated hand numbers (1-6)
//! - `state`: match state, teams, phases, ball records
//! - `opponent`: the computer side's biased number picker
//! - `delivery`: ball resolution and phase transitions
//! - `commentary`: local flavor text
//! - `events`: events emitted per ball

pub mod input;
pub mod state;
pub mod opponent;
pub mod delivery;
pub mod commentary;
pub mod events;

// Re-export key types
pub use input::{HandMove, InputError};
pub use state::{BallId, BallOutcome, Margin, MatchPhase, MatchResult, MatchState, Team, Venue};
pub use opponent::{compute_opponent_move, Decision, MoveContext, OpponentPolicy};
pub use delivery::{play_ball, DeliveryResult};
pub use events::{GameEvent, GameEventData};
