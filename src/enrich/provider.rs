//! Enrichment Providers
//!
//! In-process contracts for the optional collaborators: richer commentary
//! and coaching text, speech synthesis, and venue lookup. None of them is
//! required; the match plays identically when every provider is
//! [`Unavailable`].

use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use thiserror::Error;

use crate::game::state::{MatchPhase, MatchState, Team, Venue};
use crate::BALLS_PER_OVER;

/// Provider failures. Never fatal: the caller keeps its local content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No credential or backend configured.
    #[error("provider not configured")]
    NotConfigured,
    /// Call did not finish within the enrichment timeout.
    #[error("provider timed out")]
    Timeout,
    /// Backend returned an error or an empty answer.
    #[error("provider failed: {0}")]
    Failed(String),
}

/// Future returned by every provider call.
pub type ProviderFuture<T> = BoxFuture<'static, Result<T, ProviderError>>;

// =============================================================================
// REQUESTS
// =============================================================================

/// What a text provider is told about one ball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryRequest {
    /// Side batting
    pub batting: Team,
    /// Side bowling
    pub bowling: Team,
    /// Runs credited
    pub runs: u32,
    /// Was it a wicket?
    pub is_out: bool,
    /// Short match situation, e.g. "Score: 42" or "Chase: 30/61"
    pub context: String,
}

impl CommentaryRequest {
    /// Build the request for the last ball of `state`.
    pub fn for_last_ball(state: &MatchState) -> Option<Self> {
        let ball = state.last_ball()?;
        let context = match ball.batting {
            Team::India => format!("Score: {}", state.india_score()),
            Team::Pakistan => format!(
                "Chase: {}/{}",
                state.pakistan_score(),
                state.target().unwrap_or_default()
            ),
        };
        Some(Self {
            batting: ball.batting,
            bowling: ball.bowling,
            runs: ball.runs,
            is_out: ball.is_out,
            context,
        })
    }

    /// Prompt for a generative text backend.
    pub fn prompt(&self) -> String {
        let event = if self.is_out {
            "WICKET!".to_string()
        } else {
            format!("{} runs scored", self.runs)
        };
        format!(
            "Write a short, exciting, TV-style cricket commentary sentence (max 15 words).\n\
             Match: India vs Pakistan.\n\
             Batter: {}. Bowler: {}.\n\
             Event: {}.\n\
             Context: {}",
            self.batting, self.bowling, event, self.context
        )
    }
}

/// What a text provider is told when asked for a coaching tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachContext {
    /// Phase when the tip was requested
    pub phase: MatchPhase,
    /// India's runs
    pub india_score: u32,
    /// Pakistan's runs
    pub pakistan_score: u32,
    /// Chase target
    pub target: Option<u32>,
    /// Balls bowled in the current innings
    pub balls_bowled: usize,
}

impl CoachContext {
    /// Snapshot the parts of `state` a coach needs.
    pub fn from_state(state: &MatchState) -> Self {
        Self {
            phase: state.phase(),
            india_score: state.india_score(),
            pakistan_score: state.pakistan_score(),
            target: state.target(),
            balls_bowled: state.balls_in_innings(),
        }
    }

    /// Overs as "o.b".
    pub fn overs_label(&self) -> String {
        format!("{}.{}", self.balls_bowled / BALLS_PER_OVER, self.balls_bowled % BALLS_PER_OVER)
    }

    /// Prompt for a generative text backend. None outside the innings.
    pub fn prompt(&self) -> Option<String> {
        match self.phase {
            MatchPhase::FirstInnings => {
                let focus = if self.balls_bowled < 2 * BALLS_PER_OVER {
                    "Starting steady"
                } else {
                    "Accelerating"
                };
                Some(format!(
                    "You are a cricket coach for India. Current Score: India {}. Overs: {}.\n\
                     Give 1 short piece of advice (max 10 words) to the batter.\n\
                     Focus on: {}.",
                    self.india_score,
                    self.overs_label(),
                    focus
                ))
            }
            MatchPhase::SecondInnings => {
                let needed = self.target.unwrap_or_default().saturating_sub(self.pakistan_score);
                Some(format!(
                    "You are a cricket coach for India (Bowling). Pakistan needs {needed} runs to win.\n\
                     Give 1 short piece of tactical advice (max 10 words) to the bowler to defend the target."
                ))
            }
            MatchPhase::Menu | MatchPhase::InningsBreak | MatchPhase::MatchOver => None,
        }
    }
}

// =============================================================================
// PROVIDER TRAITS
// =============================================================================

/// Richer commentary and coaching text.
pub trait CommentaryProvider: Send + Sync {
    /// One line of commentary for a ball.
    fn ball_commentary(&self, request: CommentaryRequest) -> ProviderFuture<String>;

    /// One short coaching tip.
    fn coach_tip(&self, context: CoachContext) -> ProviderFuture<String>;
}

/// Speech synthesis for headline moments.
pub trait VoiceProvider: Send + Sync {
    /// Synthesize `text` into encoded audio bytes.
    fn synthesize(&self, text: String) -> ProviderFuture<Vec<u8>>;
}

/// Venue lookup, once per match.
pub trait VenueProvider: Send + Sync {
    /// Find a venue to show for the match.
    fn lookup_venue(&self) -> ProviderFuture<Venue>;
}

/// Provider that is never configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

fn not_configured<T: Send + 'static>() -> ProviderFuture<T> {
    future::ready(Err(ProviderError::NotConfigured)).boxed()
}

impl CommentaryProvider for Unavailable {
    fn ball_commentary(&self, _request: CommentaryRequest) -> ProviderFuture<String> {
        not_configured()
    }

    fn coach_tip(&self, _context: CoachContext) -> ProviderFuture<String> {
        not_configured()
    }
}

impl VoiceProvider for Unavailable {
    fn synthesize(&self, _text: String) -> ProviderFuture<Vec<u8>> {
        not_configured()
    }
}

impl VenueProvider for Unavailable {
    fn lookup_venue(&self) -> ProviderFuture<Venue> {
        not_configured()
    }
}

/// The set of collaborators a session talks to.
#[derive(Clone)]
pub struct Providers {
    /// Commentary and coaching text
    pub commentary: Arc<dyn CommentaryProvider>,
    /// Speech synthesis
    pub voice: Arc<dyn VoiceProvider>,
    /// Venue lookup
    pub venue: Arc<dyn VenueProvider>,
}

impl Default for Providers {
    fn default() -> Self {
        Self {
            commentary: Arc::new(Unavailable),
            voice: Arc::new(Unavailable),
            venue: Arc::new(Unavailable),
        }
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedRng;
    use crate::game::delivery::play_ball;
    use crate::game::input::HandMove;
    use crate::game::opponent::OpponentPolicy;

    fn state_after_first_ball() -> MatchState {
        let mut state = MatchState::new();
        state.start_match();
        let mut rng = ScriptedRng::new().with_dice([1]);
        play_ball(
            &mut state,
            HandMove::new(4).unwrap(),
            &OpponentPolicy::default(),
            &mut rng,
            &mut ScriptedRng::new(),
        );
        state
    }

    #[test]
    fn test_commentary_request_context() {
        let state = state_after_first_ball();
        let request = CommentaryRequest::for_last_ball(&state).unwrap();

        assert_eq!(request.batting, Team::India);
        assert_eq!(request.runs, 4);
        assert_eq!(request.context, "Score: 4");

        let prompt = request.prompt();
        assert!(prompt.contains("Batter: India. Bowler: Pakistan."));
        assert!(prompt.contains("Event: 4 runs scored."));
    }

    #[test]
    fn test_no_request_without_ball() {
        let mut state = MatchState::new();
        state.start_match();
        assert!(CommentaryRequest::for_last_ball(&state).is_none());
    }

    #[test]
    fn test_coach_prompts() {
        let mut ctx = CoachContext::from_state(&state_after_first_ball());
        assert_eq!(ctx.overs_label(), "0.1");
        assert!(ctx.prompt().unwrap().contains("Starting steady"));

        ctx.balls_bowled = 13;
        assert_eq!(ctx.overs_label(), "2.1");
        assert!(ctx.prompt().unwrap().contains("Accelerating"));

        ctx.phase = MatchPhase::SecondInnings;
        ctx.target = Some(40);
        ctx.pakistan_score = 12;
        assert!(ctx.prompt().unwrap().contains("Pakistan needs 28 runs"));

        ctx.phase = MatchPhase::MatchOver;
        assert!(ctx.prompt().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_providers() {
        let providers = Providers::default();
        let state = state_after_first_ball();
        let request = CommentaryRequest::for_last_ball(&state).unwrap();

        assert_eq!(
            providers.commentary.ball_commentary(request).await,
            Err(ProviderError::NotConfigured)
        );
        assert_eq!(
            providers.voice.synthesize("Six!".into()).await,
            Err(ProviderError::NotConfigured)
        );
        assert_eq!(providers.venue.lookup_venue().await, Err(ProviderError::NotConfigured));
    }
}
