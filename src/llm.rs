//! Generative completion backend.
//!
//! Used by the chat relay only when intent detection is not confident.
//! [`GroqClient`] speaks the OpenAI-compatible chat-completions protocol:
//! a system message carrying the portfolio prompt, one user message, and a
//! fixed model, temperature and token cap.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete one turn. `Ok(None)` means the backend answered with no content.
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<Option<String>>;
}

// ============ Wire types ============

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<PromptMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct PromptMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// First choice's content; empty or whitespace-only content counts as none.
pub fn first_choice_content(body: &serde_json::Value) -> Result<Option<String>> {
    let resp: CompletionResponse = serde_json::from_value(body.clone())
        .with_context(|| "failed to decode chat completion response")?;
    Ok(resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty()))
}

// ============ Groq ============

pub struct GroqClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_text: &'a str,
    ) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages: vec![
                PromptMessage {
                    role: "system",
                    content: system_prompt,
                },
                PromptMessage {
                    role: "user",
                    content: user_text,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<Option<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("GROQ_API_KEY not set"))?;

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request(system_prompt, user_text))
            .send()
            .await
            .with_context(|| "chat completion request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Groq API error ({}): {}", status, body);
        }

        let json: serde_json::Value = resp.json().await?;
        first_choice_content(&json)
    }
}
