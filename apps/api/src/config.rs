use std::time::Duration;

use anyhow::{Context, Result};

use crate::recommendation::resolver::{ConsumptionMode, EmptyCandidatePolicy};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Total oracle calls allowed for the lifetime of the process.
    pub oracle_request_ceiling: u32,
    pub recommendation_mode: ConsumptionMode,
    pub empty_candidate_policy: EmptyCandidatePolicy,
    pub oracle_timeout: Duration,
    pub repository_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            oracle_request_ceiling: optional_env("ORACLE_REQUEST_CEILING", "250")
                .parse::<u32>()
                .context("ORACLE_REQUEST_CEILING must be a non-negative integer")?,
            recommendation_mode: optional_env("RECOMMENDATION_MODE", "free_text")
                .parse()
                .context("RECOMMENDATION_MODE must be 'structured' or 'free_text'")?,
            empty_candidate_policy: optional_env("EMPTY_CANDIDATE_POLICY", "short_circuit")
                .parse()
                .context("EMPTY_CANDIDATE_POLICY must be 'always_query' or 'short_circuit'")?,
            oracle_timeout: parse_secs("ORACLE_TIMEOUT_SECS", "30")?,
            repository_timeout: parse_secs("REPOSITORY_TIMEOUT_SECS", "5")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_secs(key: &str, default: &str) -> Result<Duration> {
    let secs = optional_env(key, default)
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds"))?;
    Ok(Duration::from_secs(secs))
}
