//! Fallback chat through the [Gemini generateContent API](https://ai.google.dev/api/generate-content).

use std::sync::Arc;

use crate::error::ResponderError;
use crate::logger::Logger;

use super::{Responder, settle};

use generate_content::request::{Body as RequestBody, Content, GenerationConfig, Part};
use generate_content::response::Body as ResponseBody;

const PROVIDER_NAME: &str = "Gemini";

/// Sampling parameters sent with every prompt.
struct GenerationSettings {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
        }
    }
}

pub struct GeminiResponder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    settings: GenerationSettings,
    logger: Arc<dyn Logger>,
}

impl GeminiResponder {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
            settings: GenerationSettings::default(),
            logger,
        }
    }

    #[must_use]
    pub fn failure_reply() -> String {
        format!("Sorry, I couldn't get an answer from {PROVIDER_NAME}.")
    }

    async fn try_fetch(&self, prompt: &str) -> Result<String, ResponderError> {
        let body = RequestBody {
            contents: vec![Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_p: self.settings.top_p,
                top_k: self.settings.top_k,
                max_output_tokens: self.settings.max_output_tokens,
                response_mime_type: "text/plain".to_owned(),
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let resp: ResponseBody = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text: String = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ResponderError::Empty);
        }
        Ok(text.trim().to_owned())
    }
}

impl Responder for GeminiResponder {
    async fn fetch(&self, prompt: &str) -> String {
        let result = self.try_fetch(prompt).await;
        settle(
            PROVIDER_NAME,
            result,
            &Self::failure_reply(),
            None,
            self.logger.as_ref(),
        )
    }
}

mod generate_content {
    pub mod request {
        use serde::Serialize;

        #[derive(Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct Body {
            pub contents: Vec<Content>,
            pub generation_config: GenerationConfig,
        }

        #[derive(Debug, Serialize)]
        pub struct Content {
            pub role: String,
            pub parts: Vec<Part>,
        }

        #[derive(Debug, Serialize)]
        pub struct Part {
            pub text: String,
        }

        #[derive(Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct GenerationConfig {
            pub temperature: f32,
            pub top_p: f32,
            pub top_k: u32,
            pub max_output_tokens: u32,
            pub response_mime_type: String,
        }
    }

    pub mod response {
        use serde::Deserialize;

        #[derive(Debug, Deserialize)]
        pub struct Body {
            #[serde(default)]
            pub candidates: Vec<Candidate>,
        }

        #[derive(Debug, Deserialize)]
        pub struct Candidate {
            // absent when the candidate was blocked
            pub content: Option<Content>,
        }

        #[derive(Debug, Deserialize)]
        pub struct Content {
            #[serde(default)]
            pub parts: Vec<Part>,
        }

        #[derive(Debug, Deserialize)]
        pub struct Part {
            pub text: Option<String>,
        }
    }
}
