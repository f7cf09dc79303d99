//! A [`SpeechListener`] is able to listen to spoken words and transcribe them
//! to written text, one finalized transcript per utterance.
//! This module contains a [`SpeechListener`] struct which abstracts over the
//! different possible implementations.

mod console;
mod openai;

use std::sync::Arc;

use crate::config::Config;
use crate::error::SpeechError;
use crate::logger::Logger;

pub use console::ConsoleListener;
pub use openai::RealtimeListener;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognizedSpeech {
    pub text: String,
}

impl From<&str> for RecognizedSpeech {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_owned(),
        }
    }
}

pub struct SpeechListener(SpeechListenerImpl);

impl SpeechListener {
    /// Transcribes the configured recording when there is one, otherwise
    /// every typed line counts as an utterance.
    pub fn new(config: &Config, logger: Arc<dyn Logger>) -> Result<Self, SpeechError> {
        match &config.recording_file {
            Some(recording) => Ok(Self(SpeechListenerImpl::OpenAI(RealtimeListener::new(
                config.openai_key.as_deref(),
                recording,
                logger,
            )?))),
            None => Ok(Self::console()),
        }
    }

    #[must_use]
    pub fn console() -> Self {
        Self(SpeechListenerImpl::Console(ConsoleListener::new()))
    }

    pub fn start(&mut self) {
        match &mut self.0 {
            SpeechListenerImpl::Console(l) => l.start(),
            SpeechListenerImpl::OpenAI(l) => l.start(),
        }
    }

    pub fn stop(&mut self) {
        match &mut self.0 {
            SpeechListenerImpl::Console(l) => l.stop(),
            SpeechListenerImpl::OpenAI(l) => l.stop(),
        }
    }

    /// Whether typed lines are the speech input.
    #[must_use]
    pub fn hears_typed(&self) -> bool {
        matches!(self.0, SpeechListenerImpl::Console(_))
    }

    /// Turns a typed line into an utterance. `None` when the line was not
    /// heard: the listener is stopped or speech comes from a recording.
    pub fn hear_typed(&self, text: String) -> Option<RecognizedSpeech> {
        match &self.0 {
            SpeechListenerImpl::Console(l) => l.hear(text),
            SpeechListenerImpl::OpenAI(_) => None,
        }
    }

    /// Waits for the next transcribed utterance. `Ok(None)` means the input
    /// has ended and the listener has to be started again before it delivers
    /// anything. Typed speech arrives through [`Self::hear_typed`] instead, so
    /// for the console this never resolves.
    pub async fn listen_to_input(&mut self) -> anyhow::Result<Option<RecognizedSpeech>> {
        match &mut self.0 {
            SpeechListenerImpl::Console(_) => std::future::pending().await,
            SpeechListenerImpl::OpenAI(l) => l.listen_to_input().await,
        }
    }
}

enum SpeechListenerImpl {
    Console(ConsoleListener),
    OpenAI(RealtimeListener),
}
