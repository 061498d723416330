// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::WeatherConfig;
use crate::error::WeatherError;

/// One ambient weather observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Degrees Celsius
    pub temperature: f64,
    /// hPa
    pub pressure: f64,
}

/// Anything that can produce a weather reading on demand.
#[allow(async_fn_in_trait)]
pub trait WeatherSource {
    async fn fetch(&self) -> Result<Reading, WeatherError>;
}

/// Polls the equipment API of a N.I.N.A. instance:
/// `GET http://<host>:1888/api/equipment?property=weather`.
pub struct NinaWeather {
    url: String,
    client: Client,
}

impl NinaWeather {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        // N.I.N.A. lives on the local network; never route it through a proxy.
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            url: config.url(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WeatherSource for NinaWeather {
    async fn fetch(&self) -> Result<Reading, WeatherError> {
        debug!("Polling weather from {}", self.url);
        let resp = self.client.get(&self.url).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(WeatherError::Status {
                status: resp.status().as_u16(),
            });
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| WeatherError::InvalidBody {
                details: e.to_string(),
            })?;
        parse_reading(&body)
    }
}

/// Extract `Response.Temperature` and `Response.Pressure` from the body.
///
/// Both fields must be present and numeric; integers are accepted.
pub fn parse_reading(body: &Value) -> Result<Reading, WeatherError> {
    let response = body.get("Response").ok_or(WeatherError::MissingData)?;
    let temperature = response.get("Temperature").and_then(Value::as_f64);
    let pressure = response.get("Pressure").and_then(Value::as_f64);
    match (temperature, pressure) {
        (Some(temperature), Some(pressure)) => Ok(Reading {
            temperature,
            pressure,
        }),
        _ => Err(WeatherError::MissingData),
    }
}
