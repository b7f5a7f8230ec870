//! Intent detection backend.
//!
//! The chat relay first asks an NLU service to classify the visitor's text.
//! [`DialogflowClient`] calls the Dialogflow ES v2 REST API:
//!
//! ```text
//! POST {endpoint}/projects/{project}/agent/sessions/{session}:detectIntent
//! { "queryInput": { "text": { "text": "...", "languageCode": "en" } } }
//! ```
//!
//! The session id gives the backend conversational continuity; nothing is
//! tracked locally. Authentication is a bearer access token
//! (`DIALOGFLOW_ACCESS_TOKEN`), minted outside this process.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::IntentConfig;

/// Top intent for one query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntentMatch {
    /// The text as the backend understood it.
    pub query_text: String,
    /// Display name of the matched intent; empty when none matched.
    pub intent_name: String,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
    /// Canned reply attached to the intent.
    pub fulfillment_text: String,
}

#[async_trait]
pub trait IntentDetector: Send + Sync {
    async fn detect(&self, session_id: &str, text: &str) -> Result<IntentMatch>;
}

// ============ Dialogflow wire types ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: Option<QueryResult>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    query_text: String,
    #[serde(default)]
    intent: Option<IntentRef>,
    #[serde(default)]
    intent_detection_confidence: f64,
    #[serde(default)]
    fulfillment_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentRef {
    #[serde(default)]
    display_name: String,
}

impl From<QueryResult> for IntentMatch {
    fn from(r: QueryResult) -> Self {
        IntentMatch {
            query_text: r.query_text,
            intent_name: r.intent.map(|i| i.display_name).unwrap_or_default(),
            confidence: r.intent_detection_confidence,
            fulfillment_text: r.fulfillment_text,
        }
    }
}

/// Parse a `detectIntent` response body. A missing `queryResult` is an
/// empty match (no intent, zero confidence).
pub fn parse_detect_response(body: &serde_json::Value) -> Result<IntentMatch> {
    let resp: DetectIntentResponse = serde_json::from_value(body.clone())
        .with_context(|| "failed to decode detectIntent response")?;
    Ok(resp.query_result.unwrap_or_default().into())
}

// ============ Client ============

pub struct DialogflowClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: Option<String>,
    language_code: String,
    access_token: Option<String>,
}

impl DialogflowClient {
    /// Missing project or token only fail at [`detect`](IntentDetector::detect) time.
    pub fn new(config: &IntentConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            language_code: config.language_code.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// `…/projects/{project}/agent/sessions/{session}:detectIntent`, with each
    /// path segment percent-encoded.
    pub fn detect_url(&self, session_id: &str) -> Result<reqwest::Url> {
        let project_id = self
            .project_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("intent.project_id (DIALOGFLOW_PROJECT_ID) not set"))?;
        let last = format!("{}:detectIntent", session_id);
        let mut url = reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("invalid intent endpoint: {}", self.endpoint))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("intent endpoint cannot be a base: {}", self.endpoint))?
            .pop_if_empty()
            .extend([
                "projects",
                project_id,
                "agent",
                "sessions",
                last.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl IntentDetector for DialogflowClient {
    async fn detect(&self, session_id: &str, text: &str) -> Result<IntentMatch> {
        let url = self.detect_url(session_id)?;
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DIALOGFLOW_ACCESS_TOKEN not set"))?;

        let body = serde_json::json!({
            "queryInput": {
                "text": {
                    "text": text,
                    "languageCode": self.language_code,
                }
            }
        });

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .with_context(|| "detectIntent request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Dialogflow API error ({}): {}", status, body);
        }

        let json: serde_json::Value = resp.json().await?;
        parse_detect_response(&json)
    }
}
