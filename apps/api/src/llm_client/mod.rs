/// LLM Client — the single point of entry for all OpenAI API calls in the catalog service.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions go through the `CompletionOracle` trait defined here.
///
/// Model: gpt-3.5-turbo (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-3.5-turbo";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed completion response: {0}")]
    Malformed(String),
}

/// A single completion request. `system` and `temperature` fall back to the
/// provider defaults when absent.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub text: String,
}

impl Completion {
    /// Text of the first choice, if the oracle returned any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

/// Generative-text oracle: one prompt in, zero or more choices out.
///
/// `LlmClient` is the production backend; tests use in-memory stubs.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

impl ChatResponse {
    /// Validates the loosely-typed provider payload into a `Completion`.
    /// A missing `choices` field is an error; an empty list is not.
    fn into_completion(self) -> Result<Completion, LlmError> {
        let choices = self
            .choices
            .ok_or_else(|| LlmError::Malformed("response has no 'choices' field".to_string()))?;

        choices
            .into_iter()
            .map(|choice| {
                choice
                    .message
                    .map(|m| Choice {
                        text: m.content.unwrap_or_default(),
                    })
                    .ok_or_else(|| LlmError::Malformed("choice has no 'message'".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|choices| Completion { choices })
    }
}

/// The single LLM client used by the recommendation pipeline.
/// One attempt per call: retry policy belongs to the caller, not the client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionOracle for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });

        let body = ChatRequest {
            model: MODEL,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned {}: {}", status, body);
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.into_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Completion, LlmError> {
        serde_json::from_str::<ChatResponse>(json)
            .unwrap()
            .into_completion()
    }

    #[test]
    fn test_first_choice_content_is_extracted() {
        let completion = parse(
            r#"{
                "choices": [
                    {"message": {"role": "assistant", "content": "Cloud Computing 101"}},
                    {"message": {"role": "assistant", "content": "Other"}}
                ],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4}
            }"#,
        )
        .unwrap();
        assert_eq!(completion.first_text(), Some("Cloud Computing 101"));
        assert_eq!(completion.choices.len(), 2);
    }

    #[test]
    fn test_empty_choices_is_not_an_error() {
        let completion = parse(r#"{"choices": []}"#).unwrap();
        assert!(completion.first_text().is_none());
    }

    #[test]
    fn test_missing_choices_is_rejected() {
        let err = parse(r#"{"id": "chatcmpl-1"}"#).unwrap_err();
        assert!(matches!(err, LlmError::Malformed(_)));
    }

    #[test]
    fn test_null_content_becomes_empty_text() {
        let completion = parse(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(completion.first_text(), Some(""));
    }

    #[test]
    fn test_request_omits_absent_temperature() {
        let body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 150,
            temperature: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["model"], "gpt-3.5-turbo");
    }
}
