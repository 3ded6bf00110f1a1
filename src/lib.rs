//! # Hand Cricket
//!
//! Two-innings hand cricket: India (the human) against Pakistan (the computer).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       HAND CRICKET                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  └── rng.rs       - Xorshift128+ PRNG, scripted source       │
//! │                                                              │
//! │  game/            - Match engine (synchronous)               │
//! │  ├── input.rs     - Validated hand numbers                   │
//! │  ├── state.rs     - Match state and ball records             │
//! │  ├── opponent.rs  - Biased computer opponent                 │
//! │  ├── delivery.rs  - Ball resolution, phase transitions       │
//! │  ├── commentary.rs- Local flavor text                        │
//! │  └── events.rs    - Per-ball events                          │
//! │                                                              │
//! │  enrich/          - Optional collaborators (async)           │
//! │  ├── provider.rs  - Text, voice and venue contracts          │
//! │  └── session.rs   - Match session, staleness-guarded updates │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! `core/` and `game/` do no I/O and hold no global state. Every random
//! draw comes from an injected [`core::RandomSource`], so a seeded match
//! replays ball for ball. Enrichment only ever replaces commentary text,
//! the coaching tip, audio, or the venue; it never touches scoring.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod enrich;

// Re-export commonly used types
pub use core::rng::{DeterministicRng, RandomSource};
pub use game::input::HandMove;
pub use game::state::{BallOutcome, MatchPhase, MatchResult, MatchState, Team};
pub use enrich::session::{MatchSession, SessionConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Balls in an over
pub const BALLS_PER_OVER: usize = 6;
