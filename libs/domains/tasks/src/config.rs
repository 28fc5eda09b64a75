use core_config::{ConfigError, FromEnv, env_or_default, env_parse_nonzero};
use std::time::Duration;

pub const DEFAULT_GENERATION_URL: &str = "http://localhost:8081";

/// External generation endpoint settings
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Base URL; requests go to `{base_url}/ai/generate`
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl GenerationConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/ai/generate", self.base_url.trim_end_matches('/'))
    }
}

impl FromEnv for GenerationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secs = env_parse_nonzero("AI_GENERATION_TIMEOUT_SECS", 30u64)?;

        Ok(Self {
            base_url: env_or_default("AI_GENERATION_URL", DEFAULT_GENERATION_URL),
            timeout: Duration::from_secs(secs),
        })
    }
}
