//! Current weather from [Open-Meteo](https://open-meteo.com/en/docs).

use std::sync::Arc;

use serde::Deserialize;

use crate::error::ResponderError;
use crate::logger::Logger;

use super::{Responder, settle};

pub const WEATHER_FAILURE: &str = "I could not fetch the weather information.";

pub struct WeatherResponder {
    http: reqwest::Client,
    endpoint: String,
    latitude: f64,
    longitude: f64,
    logger: Arc<dyn Logger>,
}

impl WeatherResponder {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        latitude: f64,
        longitude: f64,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            http,
            endpoint,
            latitude,
            longitude,
            logger,
        }
    }

    async fn try_fetch(&self) -> Result<String, ResponderError> {
        let body: ForecastBody = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current_weather", "true".to_owned()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let CurrentWeather {
            temperature,
            weathercode,
        } = body.current_weather;
        Ok(format!(
            "The current weather is {temperature}°C with {weathercode}."
        ))
    }
}

impl Responder for WeatherResponder {
    /// The location is fixed, so the query is ignored.
    async fn fetch(&self, _query: &str) -> String {
        let result = self.try_fetch().await;
        settle("Weather", result, WEATHER_FAILURE, None, self.logger.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct ForecastBody {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    // WMO weather interpretation code, rendered as the service sends it
    weathercode: serde_json::Number,
}
