//! The conversation state machine.
//!
//! [`Conversation::transition`] is pure: it receives the current state and
//! one utterance and hands back the next state together with the side effects
//! the host has to carry out, in order. Nothing in here talks to the network
//! or to the speech backends.

use crate::actions::{Intent, classify};
use crate::responders::ResponderKind;
use crate::session::{ConversationState, PendingTask};

pub const REMINDER_PROMPT_DISPLAY: &str = "Please specify the reminder.";
pub const REMINDER_PROMPT_SPOKEN: &str = "What would you like me to remind you about?";
pub const NEWS_PROMPT_DISPLAY: &str = "What topic would you like the news on?";
pub const NEWS_PROMPT_SPOKEN: &str = "Which topic should I find the news for?";
pub const CALL_PROMPT_DISPLAY: &str = "Please specify the contact to call.";
pub const CALL_PROMPT_SPOKEN: &str = "Who would you like me to call?";
pub const NOT_RECOGNIZED_DISPLAY: &str = "Command not recognized.";
pub const NOT_RECOGNIZED_SPOKEN: &str = "Sorry, I didn't understand that.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Show the text as the latest response
    Display(String),
    /// Say the text out loud
    Speak(String),
    /// Ask a responder, then display and speak its reply
    Respond {
        responder: ResponderKind,
        query: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: ConversationState,
    pub effects: Vec<Effect>,
}

pub struct Conversation {
    chat_enabled: bool,
}

impl Conversation {
    /// Without a chat responder, unrecognized commands get a fixed answer.
    #[must_use]
    pub fn new(chat_enabled: bool) -> Self {
        Self { chat_enabled }
    }

    /// Returns `None` for transcripts that are empty after trimming; those
    /// leave the state untouched.
    #[must_use]
    pub fn transition(&self, state: &ConversationState, utterance: &str) -> Option<Transition> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return None;
        }

        let mut effects = vec![Effect::Speak(format!("You said: {utterance}"))];
        let next = match state {
            ConversationState::Idle => self.handle_command(utterance, &mut effects),
            ConversationState::AwaitingFollowUp(task) => {
                handle_follow_up(*task, utterance, &mut effects);
                ConversationState::Idle
            }
        };

        Some(Transition { next, effects })
    }

    fn handle_command(&self, utterance: &str, effects: &mut Vec<Effect>) -> ConversationState {
        match classify(utterance) {
            Intent::Reminder => {
                prompt(effects, REMINDER_PROMPT_DISPLAY, REMINDER_PROMPT_SPOKEN);
                ConversationState::AwaitingFollowUp(PendingTask::Reminder)
            }
            Intent::Weather => {
                effects.push(Effect::Respond {
                    responder: ResponderKind::Weather,
                    query: String::new(),
                });
                ConversationState::Idle
            }
            Intent::News => {
                prompt(effects, NEWS_PROMPT_DISPLAY, NEWS_PROMPT_SPOKEN);
                ConversationState::AwaitingFollowUp(PendingTask::News)
            }
            Intent::Call => {
                prompt(effects, CALL_PROMPT_DISPLAY, CALL_PROMPT_SPOKEN);
                ConversationState::AwaitingFollowUp(PendingTask::Call)
            }
            Intent::Fallback if self.chat_enabled => {
                effects.push(Effect::Respond {
                    responder: ResponderKind::Chat,
                    query: utterance.to_owned(),
                });
                ConversationState::Idle
            }
            Intent::Fallback => {
                prompt(effects, NOT_RECOGNIZED_DISPLAY, NOT_RECOGNIZED_SPOKEN);
                ConversationState::Idle
            }
        }
    }
}

fn handle_follow_up(task: PendingTask, answer: &str, effects: &mut Vec<Effect>) {
    match task {
        PendingTask::Reminder => {
            effects.push(Effect::Display(format!("Reminder set: {answer}")));
            effects.push(Effect::Speak(format!("Reminder noted: {answer}")));
        }
        PendingTask::News => effects.push(Effect::Respond {
            responder: ResponderKind::News,
            query: answer.to_owned(),
        }),
        PendingTask::Call => {
            effects.push(Effect::Display(format!("Calling {answer}...")));
            effects.push(Effect::Speak(format!("Calling {answer} now.")));
        }
    }
}

fn prompt(effects: &mut Vec<Effect>, display: &str, spoken: &str) {
    effects.push(Effect::Display(display.to_owned()));
    effects.push(Effect::Speak(spoken.to_owned()));
}
