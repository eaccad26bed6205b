use super::{Sample, Source};
use crate::config::PulsoidConfig;
use crate::error::{PulseError, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct HeartRateResponse {
    measured_at: i64,
    data: HeartRateData,
}

#[derive(Debug, Deserialize)]
struct HeartRateData {
    heart_rate: i32,
}

impl From<HeartRateResponse> for Sample {
    fn from(resp: HeartRateResponse) -> Self {
        Sample {
            measured_at: resp.measured_at,
            heart_rate: resp.data.heart_rate,
        }
    }
}

/// Polls the latest reading from the Pulsoid HTTP API.
pub struct PulsoidSource {
    client: Client,
    url: String,
    token: String,
}

impl PulsoidSource {
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
        })
    }

    /// Reads the bearer token from the configured environment variable.
    pub fn from_config(config: &PulsoidConfig) -> Result<Self> {
        let token = env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| PulseError::MissingToken(config.token_env.clone()))?;
        Self::new(
            config.url.clone(),
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl Source for PulsoidSource {
    fn fetch_one(&mut self) -> Result<Sample> {
        let resp = self
            .client
            .get(&self.url)
            .bearer_auth(&self.token)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PulseError::Source(format!("pulsoid returned {status}")));
        }

        let body = resp.text()?;
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<Sample> {
    let parsed: HeartRateResponse = serde_json::from_str(body)
        .map_err(|e| PulseError::Source(format!("parsing JSON: {e}")))?;
    Ok(parsed.into())
}
