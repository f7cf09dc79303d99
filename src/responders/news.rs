//! Headlines from the [NewsAPI](https://newsapi.org/docs/endpoints/everything)
//! keyword search.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::ResponderError;
use crate::logger::Logger;

use super::{Responder, settle};

pub const NEWS_FAILURE: &str = "I could not fetch the news.";
pub const NEWS_EMPTY: &str = "No news found for that topic.";

pub struct NewsResponder {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    logger: Arc<dyn Logger>,
}

impl NewsResponder {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        api_key: String,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key,
            logger,
        }
    }

    async fn try_fetch(&self, topic: &str) -> Result<String, ResponderError> {
        let body: SearchBody = self
            .http
            .get(&self.endpoint)
            .query(&[("q", topic), ("apiKey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = body.articles.into_iter().next().ok_or(ResponderError::Empty)?;
        Ok(format!("Here is a headline: {}", first.title))
    }
}

impl Responder for NewsResponder {
    async fn fetch(&self, topic: &str) -> String {
        let result = self.try_fetch(topic).await;
        settle(
            "News",
            result,
            NEWS_FAILURE,
            Some(NEWS_EMPTY),
            self.logger.as_ref(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
}
