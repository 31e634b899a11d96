//! OpenAI-compatible chat completions client.
//!
//! One non-streaming `POST /chat/completions` per call. The role's
//! [`BackendConfig`] decides where the request goes:
//!
//! | Provider | URL | Auth header |
//! |----------|-----|-------------|
//! | `openai` (default) | `{endpoint}/chat/completions` | `Authorization: Bearer` |
//! | `azure` | `{endpoint}/openai/deployments/{model}/chat/completions?api-version=…` | `api-key` |
//!
//! HTTP failures are mapped onto [`BackendError`] so the retry policy can
//! tell transient errors from permanent ones.

use async_trait::async_trait;
use hydra_application::ports::backend_client::{BackendClient, BackendError, ChatMessage};
use hydra_domain::RoleDefinition;
use hydra_domain::role::entities::BackendConfig;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const AZURE_API_VERSION: &str = "2024-05-01-preview";

/// Default per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct CompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client shared by every role; per-role settings travel with each call.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
}

impl OpenAiCompatibleClient {
    pub fn new() -> Result<Self, BackendError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hydra-code/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

fn is_azure(backend: &BackendConfig) -> bool {
    backend.provider.eq_ignore_ascii_case("azure")
}

/// Request URL for a backend.
pub(crate) fn completions_url(backend: &BackendConfig) -> String {
    let base = backend.endpoint.trim_end_matches('/');
    if is_azure(backend) {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            base, backend.model, AZURE_API_VERSION
        )
    } else {
        format!("{}/chat/completions", base)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| hydra_domain::core::string::truncate(body.trim(), 300))
}

/// Map a non-success HTTP status onto the backend error taxonomy.
pub(crate) fn classify_status(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
) -> BackendError {
    let message = format!("HTTP {}: {}", status.as_u16(), error_message(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimit {
            message,
            retry_after: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        },
        s if s.is_server_error() || s == StatusCode::REQUEST_TIMEOUT => {
            BackendError::Transport(message)
        }
        _ => BackendError::Malformed(message),
    }
}

/// Extract the first choice's text from a completion body.
pub(crate) fn parse_completion(body: &str) -> Result<String, BackendError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::Malformed(format!("Invalid completion JSON: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| BackendError::Malformed("Completion has no message content".to_string()))
}

#[async_trait]
impl BackendClient for OpenAiCompatibleClient {
    async fn send(
        &self,
        role: &RoleDefinition,
        messages: &[ChatMessage],
    ) -> Result<String, BackendError> {
        let backend = &role.backend;
        if !backend.is_complete() {
            return Err(BackendError::Auth(format!(
                "Role '{}' is not configured (missing {})",
                role.id,
                backend.missing_fields().join(", ")
            )));
        }

        let azure = is_azure(backend);
        let request = CompletionRequest {
            // Azure selects the model through the deployment path
            model: (!azure).then_some(backend.model.as_str()),
            messages,
            temperature: backend.temperature,
            max_tokens: backend.max_tokens,
        };

        let url = completions_url(backend);
        debug!(role = %role.id, model = %backend.model, messages = messages.len(), "Sending completion request");

        let builder = self.http.post(&url).json(&request);
        let builder = if azure {
            builder.header("api-key", backend.credential.expose())
        } else {
            builder.bearer_auth(backend.credential.expose())
        };

        let response = builder.send().await.map_err(|e| {
            BackendError::Transport(format!("Request to {} failed: {}", backend.endpoint, e))
        })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(classify_status(status, retry_after.as_deref(), &body));
        }
        parse_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_domain::role::entities::Credential;

    fn backend(provider: &str) -> BackendConfig {
        BackendConfig {
            provider: provider.to_string(),
            endpoint: "https://api.example.com/v1/".to_string(),
            credential: Credential::new("secret"),
            model: "model-a".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            completions_url(&backend("openai")),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            completions_url(&backend("Azure")),
            "https://api.example.com/v1/openai/deployments/model-a/chat/completions?api-version=2024-05-01-preview"
        );
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hello [HANDOFF: pro]"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Hello [HANDOFF: pro]");
    }

    #[test]
    fn test_parse_completion_malformed() {
        assert!(matches!(
            parse_completion("not json"),
            Err(BackendError::Malformed(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(BackendError::Malformed(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        let auth = classify_status(
            StatusCode::UNAUTHORIZED,
            None,
            r#"{"error":{"message":"bad key"}}"#,
        );
        assert_eq!(auth, BackendError::Auth("HTTP 401: bad key".to_string()));
        assert!(!auth.is_retryable());

        let limited = classify_status(StatusCode::TOO_MANY_REQUESTS, Some("7"), "slow down");
        assert_eq!(
            limited,
            BackendError::RateLimit {
                message: "HTTP 429: slow down".to_string(),
                retry_after: Some(Duration::from_secs(7)),
            }
        );

        let unavailable = classify_status(StatusCode::SERVICE_UNAVAILABLE, None, "");
        assert!(matches!(unavailable, BackendError::Transport(_)));
        assert!(unavailable.is_retryable());

        let bad_request = classify_status(StatusCode::BAD_REQUEST, None, "context too long");
        assert!(matches!(bad_request, BackendError::Malformed(_)));
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let request = CompletionRequest {
            model: Some("model-a"),
            messages: &messages,
            temperature: 0.5,
            max_tokens: 256,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "model-a");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 256);

        let azure = CompletionRequest { model: None, ..request };
        assert!(serde_json::to_value(&azure).unwrap().get("model").is_none());
    }

    #[tokio::test]
    async fn test_incomplete_role_is_rejected_without_request() {
        let client = OpenAiCompatibleClient::new().unwrap();
        let role = RoleDefinition::new("pro", "Pro");
        let err = client.send(&role, &[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, BackendError::Auth(_)));
    }
}
