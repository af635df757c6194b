/// LLM Client: the single point of entry for all model API calls.
///
/// ARCHITECTURAL RULE: No other module may call the model API directly.
/// All chat completions and embeddings MUST go through this module.
///
/// The API is OpenAI-compatible (Upstage Solar). Model names are constants so
/// every session is scored by the same models.
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::session::{ChatMessage, Role};

pub mod prompts;

/// Dialogue, narrative scoring and report synthesis.
pub const CHAT_MODEL: &str = "solar-pro";
/// Single-label emotion classification.
pub const CLASSIFIER_MODEL: &str = "solar-mini";
/// Embedding model pair: documents and queries are embedded asymmetrically.
pub const EMBEDDING_PASSAGE_MODEL: &str = "solar-embedding-1-large-passage";
pub const EMBEDDING_QUERY_MODEL: &str = "solar-embedding-1-large-query";
const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Embedding response had {got} vectors for {expected} inputs")]
    EmbeddingCount { expected: usize, got: usize },
}

/// Which side of the retrieval pair a text is embedded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingKind {
    Passage,
    Query,
}

impl EmbeddingKind {
    pub fn model(&self) -> &'static str {
        match self {
            EmbeddingKind::Passage => EMBEDDING_PASSAGE_MODEL,
            EmbeddingKind::Query => EMBEDDING_QUERY_MODEL,
        }
    }
}

/// A chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the trimmed text of the first choice, if it is non-empty.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client used by all services.
/// Wraps the chat-completions and embeddings endpoints with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    backoff_base: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            backoff_base: BACKOFF_BASE,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Makes a raw chat-completions call, returning the full response object.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    pub async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response: ChatResponse = self
            .send_with_retry(|| self.client.post(&url).json(request))
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                request.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(response)
    }

    /// Single-turn completion: one system prompt, one user message.
    pub async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, LlmError> {
        self.complete_with_history(model, system, &[], user, temperature, max_tokens)
            .await
    }

    /// Completion with prior conversation turns placed between the system
    /// prompt and the final user message.
    pub async fn complete_with_history(
        &self,
        model: &str,
        system: &str,
        history: &[ChatMessage],
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(Role::System, system));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::new(Role::User, user));

        let request = ChatRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };
        let response = self.chat(&request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    /// Convenience method that calls the chat model and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<T, LlmError> {
        let text = self.complete(CHAT_MODEL, system, prompt, 0.0, None).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }

    /// Embeds a batch of texts with the model for `kind`. Output order matches input order.
    pub async fn embed(
        &self,
        texts: &[String],
        kind: EmbeddingKind,
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model: kind.model(),
            input: texts,
        };
        let mut response: EmbeddingResponse = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;

        if response.data.len() != texts.len() {
            return Err(LlmError::EmbeddingCount {
                expected: texts.len(),
                got: response.data.len(),
            });
        }

        response.data.sort_by_key(|d| d.index);
        debug!("Embedded {} texts with {}", texts.len(), kind.model());
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn send_with_retry<T, F>(&self, build: F) -> Result<T, LlmError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(self.backoff_base, attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = build().bearer_auth(&self.api_key).send().await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json::<T>().await?);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Exponential backoff before retry `attempt` (1-based): base, 2 x base, ...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt.saturating_sub(1))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::json;

    /// Body of a chat-completions response whose first choice is `content`.
    pub fn chat_body(content: &str) -> String {
        json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::chat_body;
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_backoff_doubles_from_one_second() {
        assert_eq!(backoff_delay(BACKOFF_BASE, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(BACKOFF_BASE, 2), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_transient_server_error_is_retried() {
        let mut server = mockito::Server::new_async().await;
        // mockito serves the first mock until its expected hits are used up
        let unavailable = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(chat_body("recovered"))
            .expect(1)
            .create_async()
            .await;

        let client = LlmClient::new("k".to_string(), &server.url())
            .unwrap()
            .with_backoff_base(Duration::from_millis(5));
        let text = client
            .complete(CHAT_MODEL, "system", "hello", 0.0, None)
            .await
            .unwrap();

        assert_eq!(text, "recovered");
        unavailable.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_three_attempts() {
        let mut server = mockito::Server::new_async().await;
        let limited = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .expect(3)
            .create_async()
            .await;

        let base = Duration::from_millis(20);
        let client = LlmClient::new("k".to_string(), &server.url())
            .unwrap()
            .with_backoff_base(base);
        let started = std::time::Instant::now();
        let err = client
            .complete(CHAT_MODEL, "system", "hello", 0.0, None)
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 429, .. }), "{err:?}");
        // waits base, then 2 x base
        assert!(started.elapsed() >= base * 3);
        limited.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_error_is_retried_then_reported() {
        let client = LlmClient::new("k".to_string(), "http://127.0.0.1:1")
            .unwrap()
            .with_backoff_base(Duration::from_millis(5));
        let err = client
            .complete(CHAT_MODEL, "system", "hello", 0.0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Http(_)), "{err:?}");
    }

    #[test]
    fn test_response_text_skips_blank_content() {
        let response: ChatResponse =
            serde_json::from_str(&chat_body("   ")).expect("valid response");
        assert!(response.text().is_none());
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({
                "model": CLASSIFIER_MODEL,
                "max_tokens": 10
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("  sadness \n"))
            .create_async()
            .await;

        let client = LlmClient::new("secret".to_string(), &server.url()).unwrap();
        let text = client
            .complete(CLASSIFIER_MODEL, "classify", "I feel low", 0.0, Some(10))
            .await
            .unwrap();

        assert_eq!(text, "sadness");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "invalid api key"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = LlmClient::new("bad".to_string(), &server.url()).unwrap();
        let err = client
            .complete(CHAT_MODEL, "system", "hello", 0.7, None)
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_json_strips_fences() {
        #[derive(Deserialize)]
        struct Points {
            points: u8,
        }

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(chat_body("```json\n{\"points\": 2}\n```"))
            .create_async()
            .await;

        let client = LlmClient::new("k".to_string(), &server.url()).unwrap();
        let parsed: Points = client.call_json("system", "prompt").await.unwrap();
        assert_eq!(parsed.points, 2);
    }

    #[tokio::test]
    async fn test_embed_orders_by_index() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings")
            .match_body(Matcher::PartialJson(json!({"model": EMBEDDING_PASSAGE_MODEL})))
            .with_status(200)
            .with_body(
                json!({
                    "data": [
                        {"index": 1, "embedding": [0.0, 1.0]},
                        {"index": 0, "embedding": [1.0, 0.0]}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = LlmClient::new("k".to_string(), &server.url()).unwrap();
        let vectors = client
            .embed(
                &["first".to_string(), "second".to_string()],
                EmbeddingKind::Passage,
            )
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_rejects_count_mismatch() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(json!({"data": [{"index": 0, "embedding": [1.0]}]}).to_string())
            .create_async()
            .await;

        let client = LlmClient::new("k".to_string(), &server.url()).unwrap();
        let err = client
            .embed(&["a".to_string(), "b".to_string()], EmbeddingKind::Passage)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LlmError::EmbeddingCount {
                expected: 2,
                got: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_embed_empty_input_makes_no_request() {
        let client = LlmClient::new("k".to_string(), "http://127.0.0.1:1").unwrap();
        assert!(client
            .embed(&[], EmbeddingKind::Query)
            .await
            .unwrap()
            .is_empty());
    }
}
