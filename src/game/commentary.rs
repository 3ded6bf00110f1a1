//! Local Commentary
//!
//! Fixed flavor-text tables. Every ball gets a line from here; richer text
//! from an external provider may replace it later.

use serde::{Serialize, Deserialize};

use crate::core::rng::{choose, RandomSource};

/// Commentary category of a ball, keyed by `(is_out, runs)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentaryCategory {
    /// Dismissal
    Wicket,
    /// 1 run
    Single,
    /// 2 runs
    Double,
    /// 3 runs
    Three,
    /// 4 runs
    Boundary,
    /// 5 runs
    Five,
    /// 6 runs
    Maximum,
}

impl CommentaryCategory {
    /// Category for a resolved ball. Runs outside 1..=6 fall back to the
    /// nearest category.
    pub fn classify(is_out: bool, runs: u32) -> Self {
        if is_out {
            return CommentaryCategory::Wicket;
        }
        match runs {
            0 | 1 => CommentaryCategory::Single,
            2 => CommentaryCategory::Double,
            3 => CommentaryCategory::Three,
            4 => CommentaryCategory::Boundary,
            5 => CommentaryCategory::Five,
            _ => CommentaryCategory::Maximum,
        }
    }

    /// Lines for this category.
    pub fn lines(self) -> &'static [&'static str] {
        match self {
            CommentaryCategory::Wicket => WICKET_LINES,
            CommentaryCategory::Single => SINGLE_LINES,
            CommentaryCategory::Double => DOUBLE_LINES,
            CommentaryCategory::Three => THREE_LINES,
            CommentaryCategory::Boundary => BOUNDARY_LINES,
            CommentaryCategory::Five => FIVE_LINES,
            CommentaryCategory::Maximum => MAXIMUM_LINES,
        }
    }
}

const WICKET_LINES: &[&str] = &[
    "Clean bowled! What a delivery!",
    "Caught! Straight into the hands of the fielder.",
    "LBW! That looked plump.",
    "Run out! A mix-up in the middle.",
    "Stumped! The batter was miles out.",
    "The bails go flying! He's gone!",
    "Edged and taken! The keeper makes no mistake.",
];

const SINGLE_LINES: &[&str] = &[
    "Quick single taken.",
    "Pushed to long-on for one.",
    "Smart cricket, rotating the strike.",
    "Tapped and run, good calling.",
    "Just a single off that one.",
];

const DOUBLE_LINES: &[&str] = &[
    "Worked into the gap, they come back for two.",
    "Good running between the wickets, a couple more.",
    "Placed wide of mid-wicket for two.",
    "Hard running turns one into two.",
];

const THREE_LINES: &[&str] = &[
    "Chased down just inside the rope, three taken.",
    "Timed into the deep, they scamper back for three.",
    "Misfield in the outfield! Three runs.",
    "Excellent placement, that's three to the total.",
];

const BOUNDARY_LINES: &[&str] = &[
    "Beautiful drive through the covers for four!",
    "Smashed to the boundary! Four runs.",
    "Elegant stroke play, finding the gap.",
    "Races away to the fence!",
    "Classy shot, just timed it perfectly.",
];

const FIVE_LINES: &[&str] = &[
    "Overthrows! Five runs off a single delivery.",
    "Wild throw to the keeper's end, five added.",
    "Chaos in the field, that's five to the batting side.",
];

const MAXIMUM_LINES: &[&str] = &[
    "Maximum! That's gone out of the park!",
    "Huge hit! All the way for six!",
    "That's massive! Into the top tier!",
    "Launched into orbit! What a strike!",
    "Clean hit! That's sailing over the ropes.",
];

/// Coach line shown when a match starts.
pub const COACH_MATCH_START: &str = "Welcome to the match! Start by building a solid inning.";

/// Coach line shown when the chase starts.
pub const COACH_SECOND_INNINGS: &str = "Defend the total! Mix up your deliveries.";

/// Pick a line for a resolved ball.
pub fn local_commentary<R: RandomSource + ?Sized>(rng: &mut R, is_out: bool, runs: u32) -> String {
    let lines = CommentaryCategory::classify(is_out, runs).lines();
    choose(rng, lines).copied().unwrap_or_default().to_string()
}
