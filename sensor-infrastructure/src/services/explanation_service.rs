use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use sensor_domain::ports::ExplanationService;
use sensor_domain::ExplanationConfig;

#[derive(Debug, Error)]
pub enum ExplanationError {
    #[error("explanation credential is not configured")]
    MissingCredential,
    #[error("explanation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("explanation response had no message content")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client for the OpenRouter API. One request per call, no
/// retries.
pub struct OpenRouterExplanationService {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenRouterExplanationService {
    pub fn new(config: &ExplanationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ExplanationError::MissingCredential)?;
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        Ok(Self {
            client: builder.build()?,
            api_key,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ExplanationService for OpenRouterExplanationService {
    async fn explain(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        debug!("explanation endpoint status {}", status);
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("explanation endpoint rejected request: {}", status);
            return Err(ExplanationError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ExplanationError::EmptyResponse.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn spawn_endpoint(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/chat/completions",
                post(
                    move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|value| value.to_str().ok())
                                .map(ToString::to_string);
                            if let Ok(mut requests) = captured.requests.lock() {
                                requests.push((auth, body));
                            }
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{}/chat/completions", addr), captured)
    }

    fn config(endpoint: String) -> ExplanationConfig {
        ExplanationConfig {
            api_key: Some("sk-or-test".to_string()),
            endpoint,
            timeout_seconds: Some(5),
            ..ExplanationConfig::default()
        }
    }

    #[tokio::test]
    async fn successful_completion_returns_message_content() {
        let reply = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Coolant pump degraded." } }]
        });
        let (endpoint, captured) = spawn_endpoint(StatusCode::OK, reply).await;
        let service = OpenRouterExplanationService::new(&config(endpoint)).expect("client");

        let text = service.explain("why?").await.expect("explanation");
        assert_eq!(text, "Coolant pump degraded.");

        let requests = captured.requests.lock().expect("requests").clone();
        assert_eq!(requests.len(), 1);
        let (auth, body) = &requests[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-or-test"));
        assert_eq!(body["model"], "openai/gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "why?");
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let (endpoint, _) =
            spawn_endpoint(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })).await;
        let service = OpenRouterExplanationService::new(&config(endpoint)).expect("client");

        let err = service.explain("why?").await.expect_err("500");
        match err.downcast_ref::<ExplanationError>() {
            Some(ExplanationError::Status { status, .. }) => assert_eq!(*status, 500),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_ok_success_status_is_reported() {
        let reply = json!({
            "choices": [{ "message": { "role": "assistant", "content": "queued" } }]
        });
        let (endpoint, _) = spawn_endpoint(StatusCode::ACCEPTED, reply).await;
        let service = OpenRouterExplanationService::new(&config(endpoint)).expect("client");

        let err = service.explain("why?").await.expect_err("202");
        match err.downcast_ref::<ExplanationError>() {
            Some(ExplanationError::Status { status, .. }) => assert_eq!(*status, 202),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let (endpoint, _) = spawn_endpoint(StatusCode::OK, json!({ "choices": [] })).await;
        let service = OpenRouterExplanationService::new(&config(endpoint)).expect("client");
        let err = service.explain("why?").await.expect_err("empty");
        assert!(matches!(
            err.downcast_ref::<ExplanationError>(),
            Some(ExplanationError::EmptyResponse)
        ));
    }

    #[test]
    fn client_requires_credential() {
        let result = OpenRouterExplanationService::new(&ExplanationConfig::default());
        assert!(result.is_err());
    }
}
