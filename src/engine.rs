//! The entry points both front-ends call.

use crate::config::Settings;
use crate::embedding::EmbeddingProvider;
use crate::error::GenerationError;
use crate::question::{self, Difficulty};
use crate::session::{GuessResult, Session};
use crate::wordbank::GenrePools;
use rand::Rng;

/// Loaded model and genre data, borrowed for the lifetime of the game.
pub struct Engine<'a> {
    provider: &'a dyn EmbeddingProvider,
    pools: &'a GenrePools,
}

impl<'a> Engine<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider, pools: &'a GenrePools) -> Self {
        Self { provider, pools }
    }

    /// Pick a question and start its countdown. Nothing is created on failure.
    pub fn start_session<R: Rng + ?Sized>(
        &self,
        difficulty: &Difficulty,
        settings: &Settings,
        rng: &mut R,
    ) -> Result<Session, GenerationError> {
        let question = question::generate(difficulty, self.pools, self.provider, rng)
            .inspect_err(|e| log::warn!("No {} question: {e}", difficulty.name()))?;
        let time_limit = settings.time_limit(difficulty);
        log::info!(
            "Starting {} session ({}s)",
            difficulty.name(),
            time_limit.as_secs()
        );
        Ok(Session::new(question, time_limit))
    }

    pub fn submit_guess(&self, session: &mut Session, text: &str) -> GuessResult {
        session.submit_guess(self.provider, text)
    }
}
