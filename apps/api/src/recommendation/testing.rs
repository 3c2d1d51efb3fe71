//! In-memory collaborators for pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::catalog::repository::{CourseRepository, RepositoryError};
use crate::llm_client::{Choice, Completion, CompletionOracle, CompletionRequest, LlmError};
use crate::models::course::CourseRow;
use crate::recommendation::matcher::TermPattern;

pub fn course(title: &str, description: &str, content: &str) -> CourseRow {
    CourseRow {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.to_string(),
        content: content.to_string(),
        instructor_id: Uuid::nil(),
        created_at: Utc::now(),
    }
}

/// Repository over a fixed course list. `find_matching` applies the pattern
/// the same way the Postgres adapter's ILIKE query does.
#[derive(Default)]
pub struct StubRepository {
    courses: Vec<CourseRow>,
    fail: bool,
    delay: Option<Duration>,
    all_calls: AtomicUsize,
    matching_calls: AtomicUsize,
}

impl StubRepository {
    pub fn new(courses: Vec<CourseRow>) -> Self {
        Self {
            courses,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn all_calls(&self) -> usize {
        self.all_calls.load(Ordering::SeqCst)
    }

    pub fn matching_calls(&self) -> usize {
        self.matching_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, courses: Vec<CourseRow>) -> Result<Vec<CourseRow>, RepositoryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(RepositoryError::Unavailable("stub repository down".to_string()));
        }
        Ok(courses)
    }
}

#[async_trait]
impl CourseRepository for StubRepository {
    async fn find_all(&self) -> Result<Vec<CourseRow>, RepositoryError> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(self.courses.clone()).await
    }

    async fn find_matching(&self, pattern: &TermPattern) -> Result<Vec<CourseRow>, RepositoryError> {
        self.matching_calls.fetch_add(1, Ordering::SeqCst);
        let found = self
            .courses
            .iter()
            .filter(|c| pattern.matches(c))
            .cloned()
            .collect();
        self.respond(found).await
    }
}

/// Owned copy of a `CompletionRequest`, kept for assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

enum Script {
    Reply(String),
    NoChoices,
    Fail,
}

pub struct StubOracle {
    script: Script,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubOracle {
    fn scripted(script: Script) -> Self {
        Self {
            script,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::scripted(Script::Reply(text.to_string()))
    }

    pub fn no_choices() -> Self {
        Self::scripted(Script::NoChoices)
    }

    pub fn failing() -> Self {
        Self::scripted(Script::Fail)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionOracle for StubOracle {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.map(String::from),
            prompt: request.prompt.to_string(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Reply(text) => Ok(Completion {
                choices: vec![Choice { text: text.clone() }],
            }),
            Script::NoChoices => Ok(Completion::default()),
            Script::Fail => Err(LlmError::Api {
                status: 503,
                message: "stub oracle unavailable".to_string(),
            }),
        }
    }
}
