//! Enrichment Module
//!
//! Everything around the engine that is allowed to be slow or to fail:
//!
//! - `provider`: contracts for text, voice and venue collaborators
//! - `session`: the match session that runs them out of band

pub mod provider;
pub mod session;

pub use provider::{
    CoachContext, CommentaryProvider, CommentaryRequest, ProviderError, ProviderFuture,
    Providers, Unavailable, VenueProvider, VoiceProvider,
};
pub use session::{ConfigError, Enrichment, MatchSession, SessionConfig, SessionSnapshot, VoiceClip};
