//! Streaming review generation.
//!
//! [`client`] speaks the chat-completion wire format, [`stream`] decodes
//! the event stream incrementally, [`prompts`] builds the per-platform
//! request. [`Generator`] drives one generation at a time and tracks its
//! lifecycle phase.

pub mod client;
pub mod prompts;
pub mod stream;

use anyhow::{Result, bail};
use rand::Rng;

use crate::publish::Platform;
use crate::review::{self, ReviewDraft};
use client::{ChatMessage, SilraClient};

/// Lifecycle of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Requesting,
    Streaming,
    Parsing,
    Done,
    Error,
}

impl GenerationPhase {
    /// A generation is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Requesting | Self::Streaming | Self::Parsing)
    }
}

/// Drives one generation at a time against the model endpoint.
#[derive(Debug)]
pub struct Generator {
    client: SilraClient,
    phase: GenerationPhase,
}

impl Generator {
    pub fn new(client: SilraClient) -> Self {
        Self {
            client,
            phase: GenerationPhase::Idle,
        }
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn client(&self) -> &SilraClient {
        &self.client
    }

    /// Run one generation: request, stream deltas into `on_delta`, then
    /// post-process the transcript into a draft.
    ///
    /// A second call while one is in flight fails fast and leaves the
    /// phase untouched. A missing API key fails before any network I/O
    /// and leaves the generator idle. Request and stream failures land
    /// in the terminal `Error` phase.
    pub fn generate<F>(
        &mut self,
        messages: &[ChatMessage],
        platform: Platform,
        rng: &mut impl Rng,
        on_delta: F,
    ) -> Result<ReviewDraft>
    where
        F: FnMut(&str),
    {
        if self.phase.is_busy() {
            bail!("a generation is already running");
        }
        if !self.client.has_key() {
            self.phase = GenerationPhase::Idle;
            bail!("no AI API key configured; set SILRA_API_KEY or [ai].api_key");
        }

        self.phase = GenerationPhase::Requesting;
        let reader = match self.client.chat_stream(messages) {
            Ok(reader) => reader,
            Err(err) => {
                self.phase = GenerationPhase::Error;
                return Err(err);
            }
        };

        self.phase = GenerationPhase::Streaming;
        let transcript = match stream::read_stream(reader, on_delta) {
            Ok(text) => text,
            Err(err) => {
                self.phase = GenerationPhase::Error;
                return Err(err);
            }
        };

        self.phase = GenerationPhase::Parsing;
        let draft = review::process(&transcript, platform, rng);
        self.phase = GenerationPhase::Done;
        Ok(draft)
    }

    #[cfg(test)]
    fn set_phase(&mut self, phase: GenerationPhase) {
        self.phase = phase;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
