//! Chat relay.
//!
//! Two-tier answer path for the site's chat widget:
//!
//! ```text
//! message ──▶ intent detection ──confident──▶ fulfillment text   (source: dialogflow)
//!                   │
//!                unknown
//!                   ▼
//!             LLM completion ──ok──▶ completion text              (source: llm)
//!                   │
//!                 error
//!                   ▼
//!             fulfillment text                                    (source: dialogflow)
//! ```
//!
//! A match is "unknown" when its intent name contains `fallback` or
//! `unknown` (case-insensitive) or its confidence is below the threshold.
//! The two backend calls are sequential; the second only happens for
//! unknown matches. Intent-detection failure is the only hard error.

use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::error::RelayError;
use crate::intent::{DialogflowClient, IntentDetector, IntentMatch};
use crate::llm::{CompletionBackend, GroqClient};
use crate::models::{ChatReply, ChatRequest, ChatSource};
use crate::site;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

pub const MISSING_FIELDS: &str = "Message and sessionId are required";
pub const PROCESSING_FAILED: &str = "Failed to process message";
pub const NO_FULFILLMENT: &str = "I'm not sure how to help with that. Could you rephrase?";

const UNKNOWN_MARKERS: [&str; 2] = ["fallback", "unknown"];

/// Whether an intent match should be handed to the LLM.
pub fn is_unknown(m: &IntentMatch, threshold: f64) -> bool {
    let name = m.intent_name.to_lowercase();
    UNKNOWN_MARKERS.iter().any(|marker| name.contains(marker)) || m.confidence < threshold
}

pub struct ChatRelay {
    intents: Arc<dyn IntentDetector>,
    llm: Arc<dyn CompletionBackend>,
    system_prompt: String,
    threshold: f64,
    /// Used when the LLM succeeds with empty content.
    empty_reply: String,
}

impl ChatRelay {
    pub fn new(
        intents: Arc<dyn IntentDetector>,
        llm: Arc<dyn CompletionBackend>,
        system_prompt: impl Into<String>,
        empty_reply: impl Into<String>,
    ) -> Self {
        Self {
            intents,
            llm,
            system_prompt: system_prompt.into(),
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            empty_reply: empty_reply.into(),
        }
    }

    /// Wire Dialogflow and Groq from configuration.
    ///
    /// The system prompt is read from `[chat].system_prompt_file` when set,
    /// otherwise built from `[site]`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let system_prompt = match &config.chat.system_prompt_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read system prompt: {}", path.display()))?,
            None => site::system_prompt(&config.site),
        };

        Ok(Self::new(
            Arc::new(DialogflowClient::new(&config.intent)?),
            Arc::new(GroqClient::new(&config.llm)?),
            system_prompt,
            site::llm_empty_reply(&config.site),
        )
        .with_threshold(config.chat.confidence_threshold))
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Answer one chat message.
    ///
    /// # Errors
    ///
    /// - [`RelayError::InvalidInput`] when `message` or `sessionId` is missing or blank.
    /// - [`RelayError::Downstream`] when intent detection fails.
    ///
    /// LLM failures never surface here; they degrade to the fulfillment text.
    pub async fn respond(&self, req: ChatRequest) -> Result<ChatReply, RelayError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let (Some(message), Some(session_id)) = (present(req.message), present(req.session_id))
        else {
            return Err(RelayError::invalid(MISSING_FIELDS));
        };

        let matched = self.intents.detect(&session_id, &message).await?;
        tracing::debug!(
            session = %session_id,
            intent = %matched.intent_name,
            confidence = matched.confidence,
            "intent detected"
        );

        if is_unknown(&matched, self.threshold) && !matched.query_text.trim().is_empty() {
            tracing::info!(
                session = %session_id,
                "intent uncertain, forwarding to LLM with portfolio context"
            );
            match self.llm.complete(&self.system_prompt, &matched.query_text).await {
                Ok(content) => {
                    return Ok(ChatReply {
                        response: content.unwrap_or_else(|| self.empty_reply.clone()),
                        source: ChatSource::Llm,
                        confidence: 1.0,
                        intent: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        error = %format!("{:#}", e),
                        "LLM failed, using intent fulfillment"
                    );
                }
            }
        }

        let response = if matched.fulfillment_text.trim().is_empty() {
            NO_FULFILLMENT.to_string()
        } else {
            matched.fulfillment_text
        };

        Ok(ChatReply {
            response,
            source: ChatSource::Dialogflow,
            confidence: matched.confidence,
            intent: Some(matched.intent_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedIntent(IntentMatch);

    #[async_trait]
    impl IntentDetector for FixedIntent {
        async fn detect(&self, _session_id: &str, _text: &str) -> anyhow::Result<IntentMatch> {
            Ok(self.0.clone())
        }
    }

    struct BrokenIntent;

    #[async_trait]
    impl IntentDetector for BrokenIntent {
        async fn detect(&self, _session_id: &str, _text: &str) -> anyhow::Result<IntentMatch> {
            anyhow::bail!("dialogflow unavailable")
        }
    }

    #[derive(Default)]
    struct CountingLlm {
        calls: AtomicUsize,
        reply: Option<String>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionBackend for CountingLlm {
        async fn complete(
            &self,
            system_prompt: &str,
            user_text: &str,
        ) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(system_prompt, "PROMPT");
            assert!(!user_text.is_empty());
            if self.fail {
                anyhow::bail!("rate limited");
            }
            Ok(self.reply.clone())
        }
    }

    fn matched(name: &str, confidence: f64) -> IntentMatch {
        IntentMatch {
            query_text: "what do you build".into(),
            intent_name: name.into(),
            confidence,
            fulfillment_text: "Web and mobile apps.".into(),
        }
    }

    fn relay(intent: IntentMatch, llm: Arc<CountingLlm>) -> ChatRelay {
        ChatRelay::new(Arc::new(FixedIntent(intent)), llm, "PROMPT", "EMPTY")
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: Some(message.into()),
            session_id: Some("session-1".into()),
        }
    }

    #[test]
    fn test_is_unknown() {
        assert!(!is_unknown(&matched("services.list", 0.5), 0.5));
        assert!(is_unknown(&matched("services.list", 0.49), 0.5));
        assert!(is_unknown(&matched("Default Fallback Intent", 0.9), 0.5));
        assert!(is_unknown(&matched("UNKNOWN.topic", 1.0), 0.5));
        assert!(is_unknown(&matched("", 0.0), 0.5));
    }

    #[tokio::test]
    async fn test_confident_match_skips_llm() {
        let llm = Arc::new(CountingLlm::default());
        let reply = relay(matched("services.list", 0.92), llm.clone())
            .respond(request("services?"))
            .await
            .unwrap();

        assert_eq!(reply.source, ChatSource::Dialogflow);
        assert_eq!(reply.response, "Web and mobile apps.");
        assert_eq!(reply.intent.as_deref(), Some("services.list"));
        assert!((reply.confidence - 0.92).abs() < 1e-9);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_low_confidence_uses_llm() {
        let llm = Arc::new(CountingLlm {
            reply: Some("I build web apps.".into()),
            ..Default::default()
        });
        let reply = relay(matched("services.list", 0.2), llm.clone())
            .respond(request("hmm"))
            .await
            .unwrap();

        assert_eq!(reply.source, ChatSource::Llm);
        assert_eq!(reply.response, "I build web apps.");
        assert_eq!(reply.confidence, 1.0);
        assert!(reply.intent.is_none());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_intent_uses_llm() {
        let llm = Arc::new(CountingLlm {
            reply: Some("answer".into()),
            ..Default::default()
        });
        let reply = relay(matched("Default Fallback Intent", 0.99), llm.clone())
            .respond(request("?"))
            .await
            .unwrap();
        assert_eq!(reply.source, ChatSource::Llm);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_llm_failure_degrades_to_fulfillment() {
        let llm = Arc::new(CountingLlm {
            fail: true,
            ..Default::default()
        });
        let reply = relay(matched("Default Fallback Intent", 0.1), llm.clone())
            .respond(request("?"))
            .await
            .unwrap();

        assert_eq!(reply.source, ChatSource::Dialogflow);
        assert_eq!(reply.response, "Web and mobile apps.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_llm_content_uses_canned_reply() {
        let llm = Arc::new(CountingLlm::default());
        let reply = relay(matched("", 0.0), llm).respond(request("?")).await.unwrap();
        assert_eq!(reply.source, ChatSource::Llm);
        assert_eq!(reply.response, "EMPTY");
    }

    #[tokio::test]
    async fn test_empty_query_text_skips_llm() {
        let llm = Arc::new(CountingLlm::default());
        let mut m = matched("", 0.0);
        m.query_text.clear();
        m.fulfillment_text.clear();
        let reply = relay(m, llm.clone()).respond(request("?")).await.unwrap();
        assert_eq!(reply.source, ChatSource::Dialogflow);
        assert_eq!(reply.response, NO_FULFILLMENT);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let llm = Arc::new(CountingLlm::default());
        let relay = relay(matched("x", 1.0), llm);
        let err = relay
            .respond(ChatRequest {
                message: Some("hi".into()),
                session_id: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), MISSING_FIELDS);

        let err = relay
            .respond(ChatRequest {
                message: Some("   ".into()),
                session_id: Some("s".into()),
            })
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_intent_failure_is_downstream() {
        let relay = ChatRelay::new(
            Arc::new(BrokenIntent),
            Arc::new(CountingLlm::default()),
            "PROMPT",
            "EMPTY",
        );
        let err = relay.respond(request("hi")).await.unwrap_err();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_from_config_reads_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "custom prompt").unwrap();

        let mut config = Config::minimal();
        config.intent.project_id = Some("agent".into());
        config.chat.system_prompt_file = Some(path);
        config.chat.confidence_threshold = 0.3;

        let relay = ChatRelay::from_config(&config).unwrap();
        assert_eq!(relay.system_prompt, "custom prompt");
        assert_eq!(relay.threshold(), 0.3);
    }

    #[test]
    fn test_from_config_missing_prompt_file_errors() {
        let mut config = Config::minimal();
        config.intent.project_id = Some("agent".into());
        config.chat.system_prompt_file = Some("/nonexistent/prompt.txt".into());
        assert!(ChatRelay::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_custom_threshold() {
        let llm = Arc::new(CountingLlm {
            reply: Some("llm".into()),
            ..Default::default()
        });
        let reply = relay(matched("services.list", 0.7), llm)
            .with_threshold(0.8)
            .respond(request("?"))
            .await
            .unwrap();
        assert_eq!(reply.source, ChatSource::Llm);
    }
}
