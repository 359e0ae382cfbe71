// Resolved configuration handed to the upper layers

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub report_cache_capacity: usize,
    pub preview_rows: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            api_token: None,
            max_body_bytes: 32 * 1024 * 1024,
            request_timeout_seconds: 120,
            report_cache_capacity: 32,
            preview_rows: 5,
        }
    }
}

/// Settings for the chat-completion endpoint. The credential lives here and
/// nowhere else.
#[derive(Debug, Clone)]
pub struct ExplanationConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: Option<u64>,
}

pub const DEFAULT_EXPLANATION_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const EXPLANATION_MODEL: &str = "openai/gpt-3.5-turbo";

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_EXPLANATION_ENDPOINT.to_string(),
            model: EXPLANATION_MODEL.to_string(),
            timeout_seconds: None,
        }
    }
}
