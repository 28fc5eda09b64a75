//! Client for the external task generation service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use strum::{AsRefStr, Display};
use thiserror::Error;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::models::GeneratedTask;

/// How a generation call ended. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GenerationOutcome {
    Succeeded,
    TimedOut,
    ServerError,
    MalformedResponse,
    FallbackProduced,
}

/// Why a generation call produced nothing usable
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("generation service returned status {0}")]
    ServerError(u16),

    #[error("generation service returned an empty response")]
    EmptyResponse,

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("generation service unreachable: {0}")]
    Transport(String),
}

impl GenerationFailure {
    pub fn outcome(&self) -> GenerationOutcome {
        match self {
            GenerationFailure::TimedOut(_) => GenerationOutcome::TimedOut,
            GenerationFailure::ServerError(_) | GenerationFailure::Transport(_) => {
                GenerationOutcome::ServerError
            }
            GenerationFailure::EmptyResponse | GenerationFailure::MalformedResponse(_) => {
                GenerationOutcome::MalformedResponse
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Ask the generator for tasks matching `prompt`. Never returns an empty list on success.
    async fn generate(&self, prompt: &str) -> Result<Vec<GeneratedTask>, GenerationFailure>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// `POST {base_url}/ai/generate` over reqwest with a whole-request timeout
pub struct HttpGenerationClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpGenerationClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            timeout: config.timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> GenerationFailure {
        if err.is_timeout() {
            GenerationFailure::TimedOut(self.timeout)
        } else {
            GenerationFailure::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<GeneratedTask>, GenerationFailure> {
        debug!(endpoint = %self.endpoint, "Calling generation service");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationFailure::ServerError(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        parse_generated(&body)
    }
}

/// Decode a generation response body
pub fn parse_generated(body: &str) -> Result<Vec<GeneratedTask>, GenerationFailure> {
    if body.trim().is_empty() {
        return Err(GenerationFailure::EmptyResponse);
    }

    let items: Vec<GeneratedTask> = serde_json::from_str(body)
        .map_err(|e| GenerationFailure::MalformedResponse(e.to_string()))?;

    if items.is_empty() {
        return Err(GenerationFailure::EmptyResponse);
    }
    if items.iter().any(|item| item.title.trim().is_empty()) {
        return Err(GenerationFailure::MalformedResponse(
            "item with blank title".to_string(),
        ));
    }

    Ok(items)
}
