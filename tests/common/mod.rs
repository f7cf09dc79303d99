//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use voice_assistant::assistant::Assistant;
use voice_assistant::config::{Config, Endpoints};
use voice_assistant::logger::{ConsoleLogger, Level, Logger};
use voice_assistant::responders::Responders;
use voice_assistant::speech::output::Speaker;

/// Remembers everything it was asked to say.
#[derive(Default)]
pub struct RecordingSpeaker {
    said: RefCell<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn said(&self) -> Vec<String> {
        self.said.borrow().clone()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str) {
        self.said.borrow_mut().push(text.to_owned());
    }
}

pub fn logger() -> Arc<dyn Logger> {
    Arc::new(ConsoleLogger::new(Level::Info))
}

/// An assistant whose services all live under `base`.
pub fn assistant_for(base: &str, with_chat: bool) -> Assistant<RecordingSpeaker> {
    let mut config = Config::new("news-key".to_owned());
    config.gemini_key = with_chat.then(|| "gemini-key".to_owned());
    config.http_timeout = Duration::from_secs(2);
    config.endpoints = Endpoints {
        weather: format!("{base}/v1/forecast"),
        news: format!("{base}/v2/everything"),
        gemini: format!("{base}/v1beta"),
    };

    let logger = logger();
    let responders = Responders::new(&config, logger.clone()).unwrap();
    Assistant::new(responders, RecordingSpeaker::default(), logger)
}
