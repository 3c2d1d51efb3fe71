//! Recommendation resolution: free-text learning goal in, catalog courses out.
//!
//! Tokenizer → lexical matcher → rate-limited oracle → result assembly.
//! `Resolver` is the only entry point the HTTP layer uses.

pub mod handlers;
pub mod matcher;
pub mod oracle;
pub mod prompts;
pub mod rate_limiter;
pub mod resolver;
pub mod tokenizer;

#[cfg(test)]
pub mod testing;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::repository::RepositoryError;
use crate::llm_client::LlmError;

/// The two points where a resolution waits on an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Repository,
    Oracle,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Repository => f.write_str("course repository query"),
            Stage::Oracle => f.write_str("oracle call"),
        }
    }
}

/// Failures of a resolution. Empty queries and empty matches are not errors;
/// they are reported through `resolver::Resolution::Empty`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Oracle request limit of {ceiling} reached")]
    RateLimitExceeded { ceiling: u32 },

    #[error("Oracle call failed: {0}")]
    OracleTransport(#[from] LlmError),

    #[error("Course repository failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{stage} timed out after {}ms", .after.as_millis())]
    Timeout { stage: Stage, after: Duration },
}
