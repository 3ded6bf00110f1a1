//! Core deterministic primitives.
//!
//! Randomness lives here so the game layer never touches a global generator.

pub mod rng;

// Re-export core types
pub use rng::{DeterministicRng, RandomSource, ScriptedRng, derive_session_seed};
