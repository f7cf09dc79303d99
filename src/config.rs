use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;

use crate::logger::Level;

pub struct Config {
    pub news_api_key: String,
    pub gemini_key: Option<String>,
    pub gemini_model: String,
    pub openai_key: Option<String>,
    pub recording_file: Option<PathBuf>,
    pub tts_command: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub http_timeout: Duration,
    pub verbosity: Level,
    pub endpoints: Endpoints,
}

/// Base URLs of the external services. Overridable so the assistant can be
/// pointed at a proxy or a mock server.
pub struct Endpoints {
    pub weather: String,
    pub news: String,
    pub gemini: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: "https://api.open-meteo.com/v1/forecast".to_owned(),
            news: "https://newsapi.org/v2/everything".to_owned(),
            gemini: "https://generativelanguage.googleapis.com/v1beta".to_owned(),
        }
    }
}

impl Config {
    /// A configuration with every optional setting at its default.
    #[must_use]
    pub fn new(news_api_key: String) -> Self {
        Self {
            news_api_key,
            gemini_key: None,
            gemini_model: "gemini-1.5-flash".to_owned(),
            openai_key: None,
            recording_file: None,
            tts_command: None,
            // San Francisco
            latitude: 37.7749,
            longitude: -122.4194,
            http_timeout: Duration::from_secs(10),
            verbosity: Level::Info,
            endpoints: Endpoints::default(),
        }
    }
}

const ENV_PREFIX: &str = "VOICE_ASSISTANT__";

pub fn from_env() -> anyhow::Result<Config> {
    from_lookup(|key| env::var(key).ok())
}

/// Builds the configuration from any key-value source. `lookup` receives the
/// fully prefixed variable name.
pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get_opt = |key: &str| lookup(&format!("{ENV_PREFIX}{key}")).filter(|v| !v.is_empty());

    let news_api_key = get_opt("NEWS_API_KEY").context(format!(
        "environment variable {ENV_PREFIX}NEWS_API_KEY is required"
    ))?;
    let mut config = Config::new(news_api_key);

    config.gemini_key = get_opt("GEMINI_KEY");
    if let Some(model) = get_opt("GEMINI_MODEL") {
        config.gemini_model = model;
    }
    config.openai_key = get_opt("OPENAI_KEY");
    config.recording_file = get_opt("RECORDING_FILE")
        .map(|s| PathBuf::from_str(&s).context("Could not parse provided recording file path"))
        .transpose()?;
    config.tts_command = get_opt("TTS_COMMAND");

    if let Some(latitude) = parse_opt::<f64>("LATITUDE", get_opt("LATITUDE"))? {
        config.latitude = latitude;
    }
    if let Some(longitude) = parse_opt::<f64>("LONGITUDE", get_opt("LONGITUDE"))? {
        config.longitude = longitude;
    }
    if let Some(secs) = parse_opt::<u64>("HTTP_TIMEOUT_SECS", get_opt("HTTP_TIMEOUT_SECS"))? {
        config.http_timeout = Duration::from_secs(secs);
    }
    if parse_opt::<bool>("VERBOSE", get_opt("VERBOSE"))?.unwrap_or(false) {
        config.verbosity = Level::Debug;
    }

    if let Some(url) = get_opt("WEATHER_URL") {
        config.endpoints.weather = url;
    }
    if let Some(url) = get_opt("NEWS_URL") {
        config.endpoints.news = url;
    }
    if let Some(url) = get_opt("GEMINI_URL") {
        config.endpoints.gemini = url;
    }

    Ok(config)
}

fn parse_opt<T>(key: &str, value: Option<String>) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .context(format!("Could not parse {ENV_PREFIX}{key}='{v}'"))
        })
        .transpose()
}
