use std::{fmt, time::Duration};

use crate::{chain::MapReduceConfig, error::Error, Summarizer};

/// Credential for the summarization engine, resolved once at startup.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub const ENV_VAR: &'static str = "ANTHROPIC_API_KEY";

    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::MissingCredential(Self::ENV_VAR));
        }
        Ok(ApiKey(key.trim().to_string()))
    }

    /// Resolves the key from an already read value (e.g. a clap `env` argument).
    pub fn resolve(key: Option<String>) -> Result<Self, Error> {
        key.ok_or(Error::MissingCredential(Self::ENV_VAR))
            .and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Process wide settings for the summary dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Largest first-document token count summarized in a single pass.
    pub context_budget: usize,
    pub load_timeout: Duration,
    pub summarize_timeout: Duration,
    pub map_reduce: MapReduceConfig,
}

impl DispatchConfig {
    pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(600);

    pub fn new(context_budget: usize) -> Self {
        Self {
            context_budget,
            load_timeout: Self::DEFAULT_LOAD_TIMEOUT,
            summarize_timeout: Self::DEFAULT_SUMMARIZE_TIMEOUT,
            map_reduce: MapReduceConfig::default(),
        }
    }

    /// Budget taken from the engine's context window.
    pub fn for_summarizer<S: Summarizer>() -> Self {
        Self::new(S::CONTEXT_WINDOW_LIMIT)
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn with_summarize_timeout(mut self, timeout: Duration) -> Self {
        self.summarize_timeout = timeout;
        self
    }

    pub fn with_map_reduce(mut self, map_reduce: MapReduceConfig) -> Self {
        self.map_reduce = map_reduce;
        self
    }
}
