//! `LlmOracle` — the narrow LLM boundary (spec §9 "LLM as oracle"):
//! `generate(system, user, options) -> {content, tokens, cost}`. Prompt
//! template shapes live in [`crate::prompt`], not here.

use async_trait::async_trait;
use codegraph_core::errors::OrchestratorError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub json_mode: bool,
    pub timeout: Duration,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            json_mode: true,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub tokens: u32,
    pub cost: f64,
}

#[async_trait]
pub trait LlmOracle: Send + Sync {
    async fn generate(&self, system: &str, user: &str, options: GenerateOptions) -> Result<GenerateResponse, OrchestratorError>;
}

/// Generic chat-completions-shaped oracle, spoken to over `reqwest`. The
/// exact provider (OpenAI-compatible, Anthropic, a self-hosted gateway) is
/// a deployment concern surfaced through `endpoint`/`api_key`/`model`.
pub struct HttpLlmOracle {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpLlmOracle {
    pub fn new(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LlmOracle for HttpLlmOracle {
    async fn generate(&self, system: &str, user: &str, options: GenerateOptions) -> Result<GenerateResponse, OrchestratorError> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": options.temperature,
            "response_format": if options.json_mode { serde_json::json!({"type": "json_object"}) } else { serde_json::Value::Null },
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let call = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let resp = tokio::time::timeout(options.timeout, call)
            .await
            .map_err(|_| OrchestratorError::LlmFailed("inner timeout exceeded".to_string()))?
            .map_err(|e| OrchestratorError::LlmFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OrchestratorError::LlmFailed(format!("unexpected status {}", resp.status())));
        }

        let parsed: OracleHttpResponse = resp.json().await.map_err(|e| OrchestratorError::LlmFailed(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OrchestratorError::LlmFailed("no choices in oracle response".to_string()))?;

        Ok(GenerateResponse {
            content,
            tokens: parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
            cost: 0.0,
        })
    }
}

#[derive(serde::Deserialize)]
struct OracleHttpResponse {
    choices: Vec<OracleChoice>,
    usage: Option<OracleUsage>,
}

#[derive(serde::Deserialize)]
struct OracleChoice {
    message: OracleMessage,
}

#[derive(serde::Deserialize)]
struct OracleMessage {
    content: String,
}

#[derive(serde::Deserialize)]
struct OracleUsage {
    total_tokens: u32,
}

/// Deterministic test double. `canned` is consumed in order; running out
/// returns a `LlmFailed` so tests can exercise the neutral-review fallback.
pub struct MockLlmOracle {
    canned: std::sync::Mutex<std::collections::VecDeque<Result<String, String>>>,
}

impl MockLlmOracle {
    pub fn new(canned: Vec<Result<String, String>>) -> Self {
        Self {
            canned: std::sync::Mutex::new(canned.into_iter().collect()),
        }
    }
}

#[async_trait]
impl LlmOracle for MockLlmOracle {
    async fn generate(&self, _system: &str, _user: &str, _options: GenerateOptions) -> Result<GenerateResponse, OrchestratorError> {
        let next = self.canned.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(GenerateResponse {
                content,
                tokens: 0,
                cost: 0.0,
            }),
            Some(Err(reason)) => Err(OrchestratorError::LlmFailed(reason)),
            None => Err(OrchestratorError::LlmFailed("mock oracle exhausted".to_string())),
        }
    }
}
