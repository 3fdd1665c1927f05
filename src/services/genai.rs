// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Content generation client (Gemini REST API).
//!
//! Handles:
//! - Schema-constrained JSON generation with named invocable tools
//! - The function-calling loop (model requests a tool, we invoke it and
//!   feed the result back, bounded by `MAX_TOOL_ROUNDS`)
//! - Plain text generation for short snippets (greeting puns)
//!
//! The generated output is untrusted: callers must sanitize it. This module
//! only guarantees "syntactically valid JSON value or a typed error".

use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bounded timeout for a single generation call.
const GENERATION_TIMEOUT_SECS: u64 = 60;

/// The model is expected to invoke each tool at most once; a few extra
/// rounds of headroom, then we give up and let the caller fall back.
const MAX_TOOL_ROUNDS: usize = 4;

/// Errors from the generation service, absorbed by the orchestrator's
/// fallback chain and never propagated to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service is not configured (missing API key)")]
    NotConfigured,

    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("generation service error: {0}")]
    Api(String),

    #[error("generation output was malformed: {0}")]
    MalformedOutput(String),

    #[error("tool '{0}' failed: {1}")]
    ToolFailed(String, String),

    #[error("generation service produced no output")]
    Empty,
}

/// Declaration of a tool the generation service may invoke.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's arguments
    pub parameters: Value,
}

/// Dispatcher for tool invocations requested by the generation service.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The tools this handler exposes.
    fn declarations(&self) -> Vec<ToolDeclaration>;

    /// Invoke a tool by name with the model-supplied arguments.
    async fn invoke(&self, name: &str, args: Value) -> Result<Value, GenerationError>;
}

/// Abstract generation service, defined at the interface boundary so tests
/// can substitute a mock.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// One schema-constrained generation with tool support. Returns the
    /// parsed (but unvalidated) JSON output.
    async fn generate(&self, prompt: &str, tools: &dyn ToolHandler)
        -> Result<Value, GenerationError>;

    /// Plain text generation without tools.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// GeminiClient - reqwest implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini generateContent client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    /// Build a client against a custom endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// One round trip to the generateContent endpoint.
    async fn call_model(&self, body: &Value) -> Result<ModelContent, GenerationError> {
        let key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedOutput(format!("JSON parse error: {}", e)))?;

        parsed
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.remove(0).content
                }
            })
            .ok_or(GenerationError::Empty)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        tools: &dyn ToolHandler,
    ) -> Result<Value, GenerationError> {
        let declarations = tools.declarations();
        let tools_json = json!([{ "functionDeclarations": declarations }]);

        let mut contents = vec![json!({
            "role": "user",
            "parts": [{ "text": prompt }],
        })];

        for round in 0..=MAX_TOOL_ROUNDS {
            let body = json!({
                "contents": contents,
                "tools": tools_json,
            });

            let content = self.call_model(&body).await?;

            let calls: Vec<FunctionCall> = content
                .parts
                .iter()
                .filter_map(|p| p.function_call.clone())
                .collect();

            if calls.is_empty() {
                let text: String = content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect();
                let text = strip_code_fence(&text);
                if text.is_empty() {
                    return Err(GenerationError::Empty);
                }
                return serde_json::from_str(text).map_err(|e| {
                    GenerationError::MalformedOutput(format!("output is not valid JSON: {}", e))
                });
            }

            tracing::debug!(round, tool_calls = calls.len(), "Generation requested tools");

            // Append the model turn, then one function turn with the results.
            contents.push(
                serde_json::to_value(&content)
                    .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?,
            );

            let mut response_parts = Vec::with_capacity(calls.len());
            for call in calls {
                let result = tools.invoke(&call.name, call.args.clone()).await?;
                response_parts.push(json!({
                    "functionResponse": { "name": call.name, "response": result },
                }));
            }
            contents.push(json!({ "role": "function", "parts": response_parts }));
        }

        Err(GenerationError::Api(format!(
            "tool call rounds exceeded limit of {}",
            MAX_TOOL_ROUNDS
        )))
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let content = self.call_model(&body).await?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            Err(GenerationError::Empty)
        } else {
            Ok(text.trim().to_string())
        }
    }
}

/// Strip a markdown code fence the model sometimes wraps JSON output in.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ─── Wire Types ──────────────────────────────────────────────────

/// generateContent response envelope.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    /// Absent when the candidate was blocked.
    content: Option<ModelContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Internal(anyhow::anyhow!(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence_plain() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_bare_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_function_call_args_default_null() {
        let part: Part =
            serde_json::from_str(r#"{"functionCall": {"name": "fetchRunningNews"}}"#).unwrap();
        let call = part.function_call.unwrap();
        assert_eq!(call.name, "fetchRunningNews");
        assert!(call.args.is_null());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let client = GeminiClient::new(None, "gemini-2.0-flash".to_string());
        let err = client.generate_text("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured));
    }
}
