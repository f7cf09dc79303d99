//! Runs the conversation: feeds utterances to the state machine and carries
//! out the effects it asks for.

use std::sync::Arc;

use crate::controller::{Conversation, Effect};
use crate::logger::Logger;
use crate::responders::Responders;
use crate::session::SessionState;
use crate::speech::input::RecognizedSpeech;
use crate::speech::output::Speaker;

pub const LISTENING_STARTED: &str = "Listening for your command...";
pub const LISTENING_STOPPED: &str = "Stopped listening.";

pub struct Assistant<S: Speaker> {
    session: SessionState,
    conversation: Conversation,
    responders: Responders,
    speaker: S,
    logger: Arc<dyn Logger>,
}

impl<S: Speaker> Assistant<S> {
    pub fn new(responders: Responders, speaker: S, logger: Arc<dyn Logger>) -> Self {
        Self {
            session: SessionState::default(),
            conversation: Conversation::new(responders.has_chat()),
            responders,
            speaker,
            logger,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn speaker(&self) -> &S {
        &self.speaker
    }

    pub fn into_speaker(self) -> S {
        self.speaker
    }

    /// Returns `false` without changing anything when already listening.
    pub fn start_listening(&mut self) -> bool {
        if self.session.listening {
            return false;
        }
        self.session.listening = true;
        self.session.last_response = LISTENING_STARTED.to_owned();
        true
    }

    /// Returns `false` without changing anything when not listening.
    pub fn stop_listening(&mut self) -> bool {
        if !self.session.listening {
            return false;
        }
        self.session.listening = false;
        self.session.last_response = LISTENING_STOPPED.to_owned();
        true
    }

    /// The speech input ended on its own.
    pub fn input_ended(&mut self) {
        self.session.listening = false;
    }

    /// Processes one utterance to the end, including any responder call.
    pub async fn handle(&mut self, speech: RecognizedSpeech) {
        let Some(transition) = self
            .conversation
            .transition(&self.session.conversation, &speech.text)
        else {
            self.logger.debug("Ignoring empty transcript");
            return;
        };

        self.logger.debug(&format!(
            "Heard {:?} while {:?}, next {:?}",
            speech.text, self.session.conversation, transition.next
        ));
        self.session.last_transcript = speech.text.trim().to_owned();
        self.session.conversation = transition.next;

        for effect in transition.effects {
            self.apply(effect).await;
        }
    }

    async fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Display(text) => self.session.last_response = text,
            Effect::Speak(text) => self.speaker.speak(&text),
            Effect::Respond { responder, query } => {
                match self.responders.fetch(responder, &query).await {
                    Some(reply) => {
                        self.speaker.speak(&reply);
                        self.session.last_response = reply;
                    }
                    None => self
                        .logger
                        .warn(&format!("No {responder:?} responder configured")),
                }
            }
        }
    }
}
