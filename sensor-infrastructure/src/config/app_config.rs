use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;

use sensor_domain::{ExplanationConfig, RuntimeConfig, DEFAULT_EXPLANATION_ENDPOINT, EXPLANATION_MODEL};

use crate::config::validation::{validate_bind_addr, validate_endpoint};

pub const CONFIG_PATH_ENV: &str = "SENSOR_ANALYZER_CONFIG";
pub const CREDENTIAL_ENV: &str = "OPENROUTER_API_KEY";
const DEFAULT_CONFIG_PATH: &str = "./config.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub explanation_endpoint: String,
    pub explanation_timeout_seconds: Option<u64>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub report_cache_capacity: usize,
    pub preview_rows: usize,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            api_token: None,
            openrouter_api_key: None,
            explanation_endpoint: DEFAULT_EXPLANATION_ENDPOINT.to_string(),
            explanation_timeout_seconds: None,
            max_body_bytes: 32 * 1024 * 1024,
            request_timeout_seconds: 120,
            report_cache_capacity: 32,
            preview_rows: 5,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Config file location: `SENSOR_ANALYZER_CONFIG`, else `./config.toml`.
    pub fn config_path() -> PathBuf {
        PathBuf::from(env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()))
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()).await
    }

    /// Reads `path` when it exists (defaults otherwise), then applies env
    /// overrides, normalization and validation.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", path.display(), err))?
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.openrouter_api_key = non_blank(self.openrouter_api_key.take());
        self.log_dir = non_blank(self.log_dir.take());
        self.explanation_endpoint = self.explanation_endpoint.trim().to_string();
        if self.explanation_timeout_seconds == Some(0) {
            self.explanation_timeout_seconds = None;
        }
        if self.report_cache_capacity == 0 {
            self.report_cache_capacity = 1;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bind_addr(&self.bind_addr)?;
        validate_endpoint(&self.explanation_endpoint)?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            report_cache_capacity: self.report_cache_capacity,
            preview_rows: self.preview_rows,
        }
    }

    pub fn to_explanation_config(&self) -> ExplanationConfig {
        ExplanationConfig {
            api_key: self.openrouter_api_key.clone(),
            endpoint: self.explanation_endpoint.clone(),
            model: EXPLANATION_MODEL.to_string(),
            timeout_seconds: self.explanation_timeout_seconds,
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let (Some(base), Some(log_dir)) = (base_dir, self.log_dir.as_deref()) else {
            return;
        };
        self.log_dir = Some(resolve_path(base, log_dir));
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(CREDENTIAL_ENV) {
            self.openrouter_api_key = Some(value);
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_EXPLANATION_ENDPOINT") {
            self.explanation_endpoint = value;
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_EXPLANATION_TIMEOUT_SECONDS") {
            self.explanation_timeout_seconds = value.parse().ok();
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_REPORT_CACHE_CAPACITY") {
            self.report_cache_capacity = value.parse().unwrap_or(self.report_cache_capacity);
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_PREVIEW_ROWS") {
            self.preview_rows = value.parse().unwrap_or(self.preview_rows);
        }
        if let Ok(value) = env::var("SENSOR_ANALYZER_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
