//! Clients for the external services that answer the user. Each one turns a
//! query into a reply string and never fails: errors become a fixed apology.

mod gemini;
mod news;
mod weather;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::error::ResponderError;
use crate::logger::Logger;

pub use gemini::GeminiResponder;
pub use news::{NEWS_EMPTY, NEWS_FAILURE, NewsResponder};
pub use weather::{WEATHER_FAILURE, WeatherResponder};

pub trait Responder {
    fn fetch(&self, query: &str) -> impl Future<Output = String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponderKind {
    Weather,
    News,
    Chat,
}

pub struct Responders {
    pub weather: WeatherResponder,
    pub news: NewsResponder,
    pub chat: Option<GeminiResponder>,
}

impl Responders {
    /// Builds all responders on one shared HTTP client. The chat responder is
    /// only created when a Gemini key is configured.
    pub fn new(config: &Config, logger: Arc<dyn Logger>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            // NewsAPI rejects requests without a user agent
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let weather = WeatherResponder::new(
            http.clone(),
            config.endpoints.weather.clone(),
            config.latitude,
            config.longitude,
            logger.clone(),
        );
        let news = NewsResponder::new(
            http.clone(),
            config.endpoints.news.clone(),
            config.news_api_key.clone(),
            logger.clone(),
        );
        let chat = config.gemini_key.as_ref().map(|key| {
            GeminiResponder::new(
                http,
                config.endpoints.gemini.clone(),
                key.clone(),
                config.gemini_model.clone(),
                logger,
            )
        });

        Ok(Self {
            weather,
            news,
            chat,
        })
    }

    #[must_use]
    pub fn has_chat(&self) -> bool {
        self.chat.is_some()
    }

    /// `None` when no responder of that kind is configured. The conversation
    /// only asks for chat when [`Self::has_chat`] holds.
    pub async fn fetch(&self, kind: ResponderKind, query: &str) -> Option<String> {
        match kind {
            ResponderKind::Weather => Some(self.weather.fetch(query).await),
            ResponderKind::News => Some(self.news.fetch(query).await),
            ResponderKind::Chat => Some(self.chat.as_ref()?.fetch(query).await),
        }
    }
}

/// Turns the outcome of a request into the reply the user gets to hear.
/// `empty` is used for [`ResponderError::Empty`] when the responder has a
/// dedicated "nothing found" answer, otherwise `failure` is.
fn settle(
    name: &str,
    result: Result<String, ResponderError>,
    failure: &str,
    empty: Option<&str>,
    logger: &dyn Logger,
) -> String {
    match (result, empty) {
        (Ok(reply), _) => reply,
        (Err(ResponderError::Empty), Some(empty)) => {
            logger.debug(&format!("{name} responder found nothing"));
            empty.to_owned()
        }
        (Err(err), _) => {
            logger.warn(&format!("{name} responder failed: {err}"));
            failure.to_owned()
        }
    }
}
