//! Random Number Sources
//!
//! Every random decision in the crate (the opponent's candidate number, the
//! policy coin flips, commentary picks) is drawn through [`RandomSource`].
//! Matches use the seeded Xorshift128+ [`DeterministicRng`]; tests inject
//! [`ScriptedRng`] to pin the exact sequence.

use std::collections::VecDeque;

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

// =============================================================================
// RANDOM SOURCE
// =============================================================================

/// Source of uniform randomness.
///
/// Only `next_u64` is required. The provided helpers are overridable so a
/// scripted source can answer dice rolls and coin flips directly.
pub trait RandomSource {
    /// Generate the next 64-bit random value.
    fn next_u64(&mut self) -> u64;

    /// Generate a random integer in range [0, max).
    #[inline]
    fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large max, but acceptable
        (self.next_u64() % max as u64) as u32
    }

    /// Roll a fair die: uniform in 1..=6.
    #[inline]
    fn roll_die(&mut self) -> u8 {
        self.next_int(6) as u8 + 1
    }

    /// Return true with probability `percent`/100.
    ///
    /// `percent >= 100` is always true, `0` is always false.
    #[inline]
    fn chance(&mut self, percent: u32) -> bool {
        if percent >= 100 {
            return true;
        }
        self.next_int(100) < percent
    }
}

/// Select a random element from a slice.
pub fn choose<'a, T, R: RandomSource + ?Sized>(rng: &mut R, slice: &'a [T]) -> Option<&'a T> {
    if slice.is_empty() {
        None
    } else {
        let idx = rng.next_int(slice.len() as u32) as usize;
        slice.get(idx)
    }
}

// =============================================================================
// DETERMINISTIC RNG
// =============================================================================

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// Given the same seed, this RNG will produce the exact same sequence
/// on any platform, so a match replays identically from its seed.
///
/// # Example
///
/// ```
/// use hand_cricket::core::rng::{DeterministicRng, RandomSource};
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.roll_die(), b.roll_die());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

impl RandomSource for DeterministicRng {
    #[inline]
    fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a session's opponent seed from its identifier.
///
/// Same session id, same opponent sequence.
pub fn derive_session_seed(session_id: &[u8; 16]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"HAND_CRICKET_SEED_V1");
    hasher.update(session_id);

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// SCRIPTED RNG
// =============================================================================

/// Queue-driven random source.
///
/// `roll_die` pops from `dice`, `chance` pops from `coins`. When a queue runs
/// dry the source answers 1 / `false`; `next_u64` always yields 0, so any
/// `choose` picks the first element.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    dice: VecDeque<u8>,
    coins: VecDeque<bool>,
}

impl ScriptedRng {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue die results (each clamped into 1..=6).
    pub fn with_dice(mut self, dice: impl IntoIterator<Item = u8>) -> Self {
        self.dice.extend(dice.into_iter().map(|d| d.clamp(1, 6)));
        self
    }

    /// Queue coin-flip results.
    pub fn with_coins(mut self, coins: impl IntoIterator<Item = bool>) -> Self {
        self.coins.extend(coins);
        self
    }

    /// Append one die result.
    pub fn push_die(&mut self, value: u8) {
        self.dice.push_back(value.clamp(1, 6));
    }

    /// Append one coin-flip result.
    pub fn push_coin(&mut self, value: bool) {
        self.coins.push_back(value);
    }

    /// Number of queued dice not yet consumed.
    pub fn dice_remaining(&self) -> usize {
        self.dice.len()
    }

    /// Number of queued coins not yet consumed.
    pub fn coins_remaining(&self) -> usize {
        self.coins.len()
    }
}

impl RandomSource for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        0
    }

    fn roll_die(&mut self) -> u8 {
        self.dice.pop_front().unwrap_or(1)
    }

    fn chance(&mut self, percent: u32) -> bool {
        if percent >= 100 {
            return true;
        }
        if percent == 0 {
            return false;
        }
        self.coins.pop_front().unwrap_or(false)
    }
}

// =============================================================================
// TESTS
// =============================================================================
