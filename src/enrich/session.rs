//! Match Session
//!
//! Owns one match state and the random sources feeding it, exposes the match
//! operations to the front end, and runs optional enrichment out of band.
//!
//! Enrichment (provider commentary, coaching tips, speech, venue) runs as
//! spawned tokio tasks. Results come back over a channel and are applied
//! only if the ball (or match) they were requested for is still current.
//! A stale, failed, or timed-out enrichment is dropped; the locally
//! generated content stands and scoring is never touched.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::rng::{derive_session_seed, DeterministicRng, RandomSource};
use crate::enrich::provider::{
    CoachContext, CommentaryRequest, ProviderError, ProviderFuture, Providers,
};
use crate::game::commentary::{COACH_MATCH_START, COACH_SECOND_INNINGS};
use crate::game::delivery;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::HandMove;
use crate::game::opponent::OpponentPolicy;
use crate::game::state::{BallId, BallOutcome, MatchResult, MatchState, Venue};
use crate::BALLS_PER_OVER;

/// Unique session identifier.
pub type SessionId = [u8; 16];

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Environment variable present but unusable.
    #[error("invalid value for {var}: {value:?}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// Configuration for a match session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed opponent seed; derived from the session id when None.
    pub seed: Option<u64>,
    /// Chance (percent) of asking the text provider for a ball's commentary.
    pub commentary_chance_percent: u32,
    /// Request a coaching tip every this many balls of an innings.
    pub coach_tip_every_balls: usize,
    /// Upper bound on any single provider call.
    pub enrichment_timeout: Duration,
    /// Opponent policy constants.
    pub policy: OpponentPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            commentary_chance_percent: 20,
            coach_tip_every_balls: BALLS_PER_OVER,
            enrichment_timeout: Duration::from_secs(5),
            policy: OpponentPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Seed variable.
    pub const ENV_SEED: &'static str = "HAND_CRICKET_SEED";
    /// Commentary chance variable.
    pub const ENV_COMMENTARY_CHANCE: &'static str = "HAND_CRICKET_COMMENTARY_CHANCE";
    /// Coach tip cadence variable.
    pub const ENV_COACH_EVERY: &'static str = "HAND_CRICKET_COACH_EVERY";
    /// Provider timeout variable (milliseconds).
    pub const ENV_TIMEOUT_MS: &'static str = "HAND_CRICKET_ENRICHMENT_TIMEOUT_MS";

    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(seed) = parse_var(&lookup, Self::ENV_SEED)? {
            config.seed = Some(seed);
        }
        if let Some(chance) = parse_var::<u32, _>(&lookup, Self::ENV_COMMENTARY_CHANCE)? {
            if chance > 100 {
                return Err(ConfigError::Invalid {
                    var: Self::ENV_COMMENTARY_CHANCE,
                    value: chance.to_string(),
                });
            }
            config.commentary_chance_percent = chance;
        }
        if let Some(every) = parse_var::<usize, _>(&lookup, Self::ENV_COACH_EVERY)? {
            if every == 0 {
                return Err(ConfigError::Invalid {
                    var: Self::ENV_COACH_EVERY,
                    value: "0".into(),
                });
            }
            config.coach_tip_every_balls = every;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, Self::ENV_TIMEOUT_MS)? {
            config.enrichment_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

// =============================================================================
// ENRICHMENT
// =============================================================================

/// Result of an out-of-band provider call, waiting to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    /// Provider commentary for a ball.
    Commentary {
        /// Ball the text was written for
        ball_id: BallId,
        /// Replacement commentary
        text: String,
    },
    /// Coaching tip requested after a ball.
    CoachTip {
        /// Ball after which the tip was requested
        ball_id: BallId,
        /// Tip text
        text: String,
    },
    /// Spoken call for a headline ball.
    Voice {
        /// Ball the audio describes
        ball_id: BallId,
        /// Encoded audio
        audio: Vec<u8>,
    },
    /// Venue for a match.
    Venue {
        /// Match the lookup was made for
        match_number: u32,
        /// Venue found
        venue: Venue,
    },
}

/// Synthesized audio for a headline ball.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceClip {
    /// Ball the audio describes
    pub ball_id: BallId,
    /// Encoded audio
    #[serde(skip)]
    pub audio: Vec<u8>,
}

async fn call_with_timeout<T>(timeout: Duration, call: ProviderFuture<T>) -> Result<T, ProviderError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout),
    }
}

fn non_empty(text: String) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ProviderError::Failed("empty response".into()))
    } else {
        Ok(trimmed.to_string())
    }
}

fn log_provider_failure(what: &str, error: &ProviderError) {
    match error {
        ProviderError::NotConfigured => debug!("{} provider not configured; keeping local content", what),
        _ => warn!("{} enrichment failed: {}", what, error),
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Read-only view handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot<'a> {
    /// Full match state
    pub state: &'a MatchState,
    /// Current coaching tip
    pub coach_tip: Option<&'a str>,
    /// Completed overs and balls of the current innings
    pub overs: (usize, usize),
    /// Runs Pakistan still need
    pub runs_needed: Option<u32>,
    /// Final result, once decided
    pub result: Option<MatchResult>,
    /// Latest spoken call
    pub voice: Option<&'a VoiceClip>,
}

// =============================================================================
// MATCH SESSION
// =============================================================================

/// One player's match session.
pub struct MatchSession<R: RandomSource = DeterministicRng> {
    /// Unique session identifier.
    id: SessionId,
    /// Session configuration.
    config: SessionConfig,
    /// Authoritative match state.
    state: MatchState,
    /// Opponent randomness.
    rng: R,
    /// Commentary picks and enrichment rolls.
    flavor_rng: DeterministicRng,
    /// External collaborators.
    providers: Providers,
    /// Current coaching tip.
    coach_tip: Option<String>,
    /// Latest spoken call.
    last_voice: Option<VoiceClip>,
    /// Enrichment results from spawned tasks.
    enrich_tx: mpsc::UnboundedSender<Enrichment>,
    enrich_rx: mpsc::UnboundedReceiver<Enrichment>,
}

impl MatchSession<DeterministicRng> {
    /// Create a new session seeded from config (or from its own id).
    pub fn new(config: SessionConfig) -> Self {
        let id = *uuid::Uuid::new_v4().as_bytes();
        let seed = config.seed.unwrap_or_else(|| derive_session_seed(&id));
        Self::build(id, config, DeterministicRng::new(seed), seed)
    }
}

impl<R: RandomSource> MatchSession<R> {
    /// Create a session around a caller-supplied opponent random source.
    pub fn with_rng(config: SessionConfig, rng: R) -> Self {
        let id = *uuid::Uuid::new_v4().as_bytes();
        let seed = config.seed.unwrap_or_else(|| derive_session_seed(&id));
        Self::build(id, config, rng, seed)
    }

    fn build(id: SessionId, config: SessionConfig, rng: R, seed: u64) -> Self {
        let (enrich_tx, enrich_rx) = mpsc::unbounded_channel();
        debug!("Session {} created", hex::encode(&id[..4]));

        Self {
            id,
            config,
            state: MatchState::new(),
            rng,
            flavor_rng: DeterministicRng::new(seed.wrapping_add(1)),
            providers: Providers::default(),
            coach_tip: None,
            last_voice: None,
            enrich_tx,
            enrich_rx,
        }
    }

    /// Replace the enrichment providers.
    pub fn with_providers(mut self, providers: Providers) -> Self {
        self.providers = providers;
        self
    }

    // -------------------------------------------------------------------------
    // Read-only access
    // -------------------------------------------------------------------------

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current match state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Current coaching tip.
    pub fn coach_tip(&self) -> Option<&str> {
        self.coach_tip.as_deref()
    }

    /// Latest spoken call, if it belongs to the current last ball.
    pub fn last_voice(&self) -> Option<&VoiceClip> {
        self.last_voice.as_ref()
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            state: &self.state,
            coach_tip: self.coach_tip(),
            overs: self.state.overs(),
            runs_needed: self.state.runs_needed(),
            result: self.state.result(),
            voice: self.last_voice(),
        }
    }

    /// Snapshot serialized as JSON.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Start a new match from any phase.
    pub fn start_match(&mut self) {
        self.state.start_match();
        self.coach_tip = Some(COACH_MATCH_START.to_string());
        self.last_voice = None;
        info!(
            "Session {} match {} started",
            hex::encode(&self.id[..4]),
            self.state.match_number()
        );
        self.request_venue();
    }

    /// Restart with fresh scores.
    pub fn restart_match(&mut self) {
        self.state.restart_match();
        self.coach_tip = None;
        self.last_voice = None;
        info!(
            "Session {} match {} restarted",
            hex::encode(&self.id[..4]),
            self.state.match_number()
        );
        self.request_venue();
    }

    /// Back to the menu.
    pub fn return_to_menu(&mut self) {
        self.state.return_to_menu();
        self.coach_tip = None;
        self.last_voice = None;
        debug!("Session {} back to menu", hex::encode(&self.id[..4]));
    }

    /// Begin the chase. Ignored outside the innings break.
    pub fn start_second_innings(&mut self) -> bool {
        if !self.state.start_second_innings() {
            debug!("Ignoring second innings request in {}", self.state.phase());
            return false;
        }
        self.coach_tip = Some(COACH_SECOND_INNINGS.to_string());
        self.last_voice = None;
        info!(
            "Second innings: Pakistan need {} to win",
            self.state.target().unwrap_or_default()
        );
        true
    }

    /// Play one ball with the human's number.
    ///
    /// Returns the resolved ball, or None if no ball can be played in the
    /// current phase (state unchanged).
    pub fn play_ball(&mut self, human: HandMove) -> Option<&BallOutcome> {
        let result = delivery::play_ball(
            &mut self.state,
            human,
            &self.config.policy,
            &mut self.rng,
            &mut self.flavor_rng,
        );

        let Some(ball) = result.ball else {
            debug!("Ignoring ball in {}", self.state.phase());
            return None;
        };
        // Any clip belongs to an earlier ball now
        self.last_voice = None;

        debug!(
            "Ball {}: {} {} v {} {} -> {}",
            ball.id,
            ball.batting,
            ball.batting_move,
            ball.bowling,
            ball.bowling_move,
            if ball.is_out { "OUT".to_string() } else { format!("{} runs", ball.runs) }
        );
        self.log_events(&result.events);
        self.schedule_enrichment(&ball, &result.events);

        self.state.last_ball()
    }

    fn log_events(&self, events: &[GameEvent]) {
        for event in events {
            match &event.data {
                GameEventData::InningsEnded { batting, total, target } => {
                    info!("{} all out for {}; target {}", batting, total, target);
                }
                GameEventData::MatchEnded { .. } => {
                    if let Some(result) = self.state.result() {
                        info!("Match over: {}", result);
                    }
                }
                GameEventData::PhaseChanged { old_phase, new_phase } => {
                    debug!("Phase {} -> {}", old_phase, new_phase);
                }
                GameEventData::BallBowled { .. } => {}
            }
        }
    }

    // -------------------------------------------------------------------------
    // Enrichment
    // -------------------------------------------------------------------------

    fn schedule_enrichment(&mut self, ball: &BallOutcome, events: &[GameEvent]) {
        let fetch_text = self.flavor_rng.chance(self.config.commentary_chance_percent);
        let speak = events.iter().any(GameEvent::is_highlight);
        let coach = self.state.phase().is_in_play()
            && !ball.is_out
            && self.state.balls_in_innings() % self.config.coach_tip_every_balls == 0;

        if !(fetch_text || speak || coach) {
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            debug!("No async runtime; skipping enrichment for ball {}", ball.id);
            return;
        };

        if fetch_text || speak {
            if let Some(request) = CommentaryRequest::for_last_ball(&self.state) {
                let tx = self.enrich_tx.clone();
                let text_provider = self.providers.commentary.clone();
                let voice_provider = self.providers.voice.clone();
                let timeout = self.config.enrichment_timeout;
                let ball_id = ball.id;
                let mut text = ball.commentary.clone();

                handle.spawn(async move {
                    if fetch_text {
                        let call = text_provider.ball_commentary(request);
                        match call_with_timeout(timeout, call).await.and_then(non_empty) {
                            Ok(fresh) => {
                                text = fresh.clone();
                                let _ = tx.send(Enrichment::Commentary { ball_id, text: fresh });
                            }
                            Err(e) => log_provider_failure("commentary", &e),
                        }
                    }
                    if speak {
                        match call_with_timeout(timeout, voice_provider.synthesize(text)).await {
                            Ok(audio) => {
                                let _ = tx.send(Enrichment::Voice { ball_id, audio });
                            }
                            Err(e) => log_provider_failure("voice", &e),
                        }
                    }
                });
            }
        }

        if coach {
            let tx = self.enrich_tx.clone();
            let provider = self.providers.commentary.clone();
            let timeout = self.config.enrichment_timeout;
            let context = CoachContext::from_state(&self.state);
            let ball_id = ball.id;

            handle.spawn(async move {
                let call = provider.coach_tip(context);
                match call_with_timeout(timeout, call).await.and_then(non_empty) {
                    Ok(text) => {
                        let _ = tx.send(Enrichment::CoachTip { ball_id, text });
                    }
                    Err(e) => log_provider_failure("coach", &e),
                }
            });
        }
    }

    fn request_venue(&mut self) {
        let Ok(handle) = Handle::try_current() else {
            debug!("No async runtime; skipping venue lookup");
            return;
        };

        let tx = self.enrich_tx.clone();
        let provider = self.providers.venue.clone();
        let timeout = self.config.enrichment_timeout;
        let match_number = self.state.match_number();

        handle.spawn(async move {
            match call_with_timeout(timeout, provider.lookup_venue()).await {
                Ok(venue) => {
                    let _ = tx.send(Enrichment::Venue { match_number, venue });
                }
                Err(e) => log_provider_failure("venue", &e),
            }
        });
    }

    fn is_latest(&self, ball_id: BallId) -> bool {
        self.state.last_ball().is_some_and(|b| b.id == ball_id)
    }

    /// Apply one enrichment if its ball or match is still current.
    ///
    /// Returns false when the update was stale and discarded.
    pub fn apply_enrichment(&mut self, enrichment: Enrichment) -> bool {
        let applied = match enrichment {
            Enrichment::Commentary { ball_id, text } => self.state.replace_commentary(ball_id, text),
            Enrichment::CoachTip { ball_id, text } => {
                if self.is_latest(ball_id) {
                    self.coach_tip = Some(text);
                    true
                } else {
                    false
                }
            }
            Enrichment::Voice { ball_id, audio } => {
                if self.is_latest(ball_id) {
                    self.last_voice = Some(VoiceClip { ball_id, audio });
                    true
                } else {
                    false
                }
            }
            Enrichment::Venue { match_number, venue } => self.state.set_venue(match_number, venue),
        };

        if !applied {
            debug!("Discarded stale enrichment");
        }
        applied
    }

    /// Apply every enrichment that has already arrived.
    ///
    /// Returns how many were applied (stale ones are dropped).
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(enrichment) = self.enrich_rx.try_recv() {
            if self.apply_enrichment(enrichment) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next enrichment and apply it.
    ///
    /// Returns whether it was applied. Pends until a provider answers, so
    /// callers typically race it against input or a timeout.
    pub async fn next_enrichment(&mut self) -> bool {
        // The session holds a sender, so the channel never closes.
        match self.enrich_rx.recv().await {
            Some(enrichment) => self.apply_enrichment(enrichment),
            None => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
