use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::llm_client::{CompletionOracle, CompletionRequest};
use crate::recommendation::prompts::{
    build_refine_prompt, RECOMMENDATION_MAX_TOKENS, REFINE_SYSTEM, REFINE_TEMPERATURE,
    REFINE_TITLES_SYSTEM,
};
use crate::recommendation::rate_limiter::RateLimiter;
use crate::recommendation::resolver::ConsumptionMode;
use crate::recommendation::{ResolveError, Stage};

/// What the oracle said. `NoRecommendations` means the call succeeded but
/// produced nothing; it is never used for a failed call.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleReply {
    Text(String),
    NoRecommendations,
}

/// Rate-limited, time-bounded access to the generative-text oracle.
#[derive(Clone)]
pub struct RecommendationOracle {
    oracle: Arc<dyn CompletionOracle>,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
}

impl RecommendationOracle {
    pub fn new(oracle: Arc<dyn CompletionOracle>, limiter: Arc<RateLimiter>, timeout: Duration) -> Self {
        Self {
            oracle,
            limiter,
            timeout,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Asks the oracle to pick the best of `summaries` for `goal`.
    /// In structured mode the instruction asks for bare catalog titles.
    pub async fn refine(
        &self,
        goal: &str,
        summaries: &[String],
        mode: ConsumptionMode,
    ) -> Result<OracleReply, ResolveError> {
        let system = match mode {
            ConsumptionMode::Structured => REFINE_TITLES_SYSTEM,
            ConsumptionMode::FreeText => REFINE_SYSTEM,
        };
        let prompt = build_refine_prompt(goal, summaries);
        debug!("Refining {} candidate summaries", summaries.len());

        self.call(CompletionRequest {
            system: Some(system),
            prompt: &prompt,
            max_tokens: RECOMMENDATION_MAX_TOKENS,
            temperature: Some(REFINE_TEMPERATURE),
        })
        .await
    }

    /// Plain variant: the caller's prompt as-is, default sampling.
    pub async fn ask(&self, prompt: &str) -> Result<OracleReply, ResolveError> {
        self.call(CompletionRequest {
            system: None,
            prompt,
            max_tokens: RECOMMENDATION_MAX_TOKENS,
            temperature: None,
        })
        .await
    }

    async fn call(&self, request: CompletionRequest<'_>) -> Result<OracleReply, ResolveError> {
        if !self.limiter.try_acquire() {
            warn!(
                "Oracle request limit reached ({} calls)",
                self.limiter.ceiling()
            );
            return Err(ResolveError::RateLimitExceeded {
                ceiling: self.limiter.ceiling(),
            });
        }
        info!(
            "Oracle requests made: {}/{}",
            self.limiter.used(),
            self.limiter.ceiling()
        );

        let completion = tokio::time::timeout(self.timeout, self.oracle.complete(request))
            .await
            .map_err(|_| ResolveError::Timeout {
                stage: Stage::Oracle,
                after: self.timeout,
            })??;

        match completion.first_text().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(OracleReply::Text(text.to_string())),
            Some(_) => {
                warn!("Oracle returned a blank choice");
                Ok(OracleReply::NoRecommendations)
            }
            None => {
                warn!("Oracle returned no choices");
                Ok(OracleReply::NoRecommendations)
            }
        }
    }
}

/// Splits an oracle reply into candidate titles. Every non-blank line is a
/// candidate as written (trimmed); when it starts with a list marker (`-`,
/// `*`, `1.`, `2)`) the unmarked remainder is a candidate too, so both a
/// numbered reply and a catalog title that itself starts with a marker match.
pub fn recommendation_lines(reply: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for line in reply.lines().map(str::trim).filter(|line| !line.is_empty()) {
        candidates.push(line.to_string());
        let unmarked = strip_list_marker(line);
        if unmarked != line && !unmarked.is_empty() {
            candidates.push(unmarked.to_string());
        }
    }
    candidates
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    line
}
