//! Resolver — orchestrates one recommendation request.
//!
//! ```text
//! Idle -> TermsExtracted -> CandidatesFound -> OracleQueried -> Done
//!              |                  |
//!              +-> Done(empty)    +-> Done(empty)   (ShortCircuit policy)
//! any stage -> Failed
//! ```
//!
//! The deployment picks a `ConsumptionMode` and an `EmptyCandidatePolicy`;
//! `Resolver::mode` and `Resolver::policy` report the contract in force.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::repository::{CourseRepository, RepositoryError};
use crate::models::course::CourseRow;
use crate::recommendation::matcher::{match_candidates, match_titles};
use crate::recommendation::oracle::{recommendation_lines, OracleReply, RecommendationOracle};
use crate::recommendation::rate_limiter::RateLimiter;
use crate::recommendation::tokenizer::tokenize;
use crate::recommendation::{ResolveError, Stage};

pub const NO_RECOMMENDATIONS_MESSAGE: &str = "No recommendations were found.";
pub const NO_MATCHING_COURSES_MESSAGE: &str = "No matching courses found.";

#[derive(Debug, Error)]
#[error("unknown setting value '{0}'")]
pub struct UnknownSetting(String);

/// How the oracle's reply becomes a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionMode {
    /// Reply lines are reconciled against catalog titles.
    Structured,
    /// Reply is returned as prose.
    #[default]
    FreeText,
}

impl FromStr for ConsumptionMode {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "free_text" | "freetext" | "text" => Ok(Self::FreeText),
            other => Err(UnknownSetting(other.to_string())),
        }
    }
}

/// What to do when lexical matching finds nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCandidatePolicy {
    /// Call the oracle anyway, with an empty summaries block.
    AlwaysQuery,
    /// Answer "no matching courses" without calling the oracle.
    #[default]
    ShortCircuit,
}

impl FromStr for EmptyCandidatePolicy {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always_query" | "alwaysquery" => Ok(Self::AlwaysQuery),
            "short_circuit" | "shortcircuit" => Ok(Self::ShortCircuit),
            other => Err(UnknownSetting(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The prompt produced no usable search terms.
    EmptyQuery,
    /// Lexical or title matching produced no courses.
    NoMatchFound,
}

/// Outcome of a successful resolution. Rebuilt on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Courses { courses: Vec<CourseRow> },
    Text { text: String },
    NoRecommendations,
    Empty { reason: EmptyReason },
}

impl Resolution {
    fn empty(reason: EmptyReason) -> Self {
        Resolution::Empty { reason }
    }

    /// Human-readable note for outcomes that carry no payload.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Resolution::NoRecommendations => Some(NO_RECOMMENDATIONS_MESSAGE),
            Resolution::Empty {
                reason: EmptyReason::NoMatchFound,
            } => Some(NO_MATCHING_COURSES_MESSAGE),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
    Idle,
    TermsExtracted,
    CandidatesFound,
    OracleQueried,
    Done,
    Failed,
}

impl ResolveState {
    fn advance(&mut self, next: ResolveState) {
        debug!("Resolver {:?} -> {:?}", self, next);
        *self = next;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    pub mode: ConsumptionMode,
    pub policy: EmptyCandidatePolicy,
    pub repository_timeout: Duration,
}

/// Stateless per request; share behind `Arc`.
pub struct Resolver {
    repository: Arc<dyn CourseRepository>,
    oracle: RecommendationOracle,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        repository: Arc<dyn CourseRepository>,
        oracle: RecommendationOracle,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            repository,
            oracle,
            settings,
        }
    }

    pub fn mode(&self) -> ConsumptionMode {
        self.settings.mode
    }

    pub fn policy(&self) -> EmptyCandidatePolicy {
        self.settings.policy
    }

    pub fn limiter(&self) -> &RateLimiter {
        self.oracle.limiter()
    }

    /// Resolves a learning goal into recommendations using the configured
    /// mode and empty-candidate policy. Failures return no partial result.
    pub async fn resolve(&self, goal: &str) -> Result<Resolution, ResolveError> {
        let mut state = ResolveState::Idle;
        let result = self.run(goal, &mut state).await;
        if let Err(e) = &result {
            warn!("Resolution failed after {:?}: {e}", state);
            state.advance(ResolveState::Failed);
        }
        result
    }

    async fn run(&self, goal: &str, state: &mut ResolveState) -> Result<Resolution, ResolveError> {
        let terms = tokenize(goal);
        state.advance(ResolveState::TermsExtracted);

        if terms.is_empty() {
            debug!("Prompt has no usable terms");
            state.advance(ResolveState::Done);
            return Ok(Resolution::empty(EmptyReason::EmptyQuery));
        }

        let candidates = self
            .bounded(match_candidates(&terms, self.repository.as_ref()))
            .await?;
        state.advance(ResolveState::CandidatesFound);

        if candidates.is_empty() && self.settings.policy == EmptyCandidatePolicy::ShortCircuit {
            info!("No matching courses found");
            state.advance(ResolveState::Done);
            return Ok(Resolution::empty(EmptyReason::NoMatchFound));
        }

        let summaries: Vec<String> = candidates.iter().map(CourseRow::summary).collect();
        let reply = self
            .oracle
            .refine(goal, &summaries, self.settings.mode)
            .await?;
        state.advance(ResolveState::OracleQueried);

        let resolution = match (reply, self.settings.mode) {
            (OracleReply::NoRecommendations, _) => Resolution::NoRecommendations,
            (OracleReply::Text(text), ConsumptionMode::FreeText) => Resolution::Text { text },
            (OracleReply::Text(text), ConsumptionMode::Structured) => {
                self.reconcile(&text).await?
            }
        };

        state.advance(ResolveState::Done);
        Ok(resolution)
    }

    /// Sends the prompt to the oracle unchanged and maps the reply lines onto
    /// catalog titles, skipping lexical matching entirely.
    pub async fn recommend_direct(&self, prompt: &str) -> Result<Resolution, ResolveError> {
        if prompt.trim().is_empty() {
            return Ok(Resolution::empty(EmptyReason::EmptyQuery));
        }

        match self.oracle.ask(prompt).await? {
            OracleReply::NoRecommendations => Ok(Resolution::NoRecommendations),
            OracleReply::Text(text) => self.reconcile(&text).await,
        }
    }

    async fn reconcile(&self, reply: &str) -> Result<Resolution, ResolveError> {
        let lines = recommendation_lines(reply);
        let courses = self
            .bounded(match_titles(&lines, self.repository.as_ref()))
            .await?;

        if courses.is_empty() {
            return Ok(Resolution::empty(EmptyReason::NoMatchFound));
        }
        Ok(Resolution::Courses { courses })
    }

    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, ResolveError> {
        let after = self.settings.repository_timeout;
        tokio::time::timeout(after, query)
            .await
            .map_err(|_| ResolveError::Timeout {
                stage: Stage::Repository,
                after,
            })?
            .map_err(ResolveError::from)
    }
}
