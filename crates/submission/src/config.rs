//! Submission configuration

use serde::Deserialize;

/// Runtime configuration for the submission service
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    /// Directory holding the versioned schema artifacts
    #[serde(default = "default_schema_dir")]
    pub schema_dir: String,
    /// Actor recorded on system-initiated audit entries
    #[serde(default = "default_actor")]
    pub actor: String,
    /// How often the retry scheduler scans for due batches, in seconds
    #[serde(default = "default_retry_poll_secs")]
    pub retry_poll_secs: u64,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_dir() -> String {
    "schemas".to_string()
}

fn default_actor() -> String {
    "system".to_string()
}

fn default_retry_poll_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            actor: default_actor(),
            retry_poll_secs: default_retry_poll_secs(),
            log_level: default_log_level(),
        }
    }
}

impl SubmissionConfig {
    /// Loads configuration from `TISS_`-prefixed environment variables.
    ///
    /// Each unset variable falls back to its own default; a variable that is
    /// set but malformed is an error, never silently discarded.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("TISS").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
