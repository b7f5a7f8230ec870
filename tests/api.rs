//! Router-level tests against in-process fake backends.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use portfolio_site::chat::ChatRelay;
use portfolio_site::config::Config;
use portfolio_site::content::{ContentStore, MemoryStore};
use portfolio_site::intent::{IntentDetector, IntentMatch};
use portfolio_site::llm::CompletionBackend;
use portfolio_site::mailer::{ContactEmail, Mailer};
use portfolio_site::server::{router, AppState};

// ============ Fakes ============

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<ContactEmail>>,
    fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &ContactEmail) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("535 authentication failed");
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

enum IntentBehavior {
    Match(IntentMatch),
    Fail,
}

struct FakeIntent(IntentBehavior);

#[async_trait]
impl IntentDetector for FakeIntent {
    async fn detect(&self, _session_id: &str, text: &str) -> anyhow::Result<IntentMatch> {
        match &self.0 {
            IntentBehavior::Match(m) => Ok(IntentMatch {
                query_text: text.to_string(),
                ..m.clone()
            }),
            IntentBehavior::Fail => anyhow::bail!("invalid grant"),
        }
    }
}

#[derive(Default)]
struct FakeLlm {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl CompletionBackend for FakeLlm {
    async fn complete(
        &self,
        _system_prompt: &str,
        user_text: &str,
    ) -> anyhow::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("429 rate limited");
        }
        Ok(Some(format!("LLM answer to: {}", user_text)))
    }
}

struct Harness {
    mailer: Arc<RecordingMailer>,
    llm: Arc<FakeLlm>,
    state: AppState,
}

impl Harness {
    fn build(mailer: RecordingMailer, intent: IntentBehavior, llm: FakeLlm) -> Self {
        let mut config = Config::minimal();
        config.smtp.user = Some("relay@example.com".into());
        config.contact.recipient = Some("inbox@example.com".into());
        config.content.project_id = Some("proj".into());
        let config = Arc::new(config);

        let content: Arc<dyn ContentStore> = Arc::new(
            MemoryStore::from_json_file(
                &Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content.json"),
            )
            .unwrap(),
        );

        let mailer = Arc::new(mailer);
        let llm = Arc::new(llm);
        let relay = ChatRelay::new(
            Arc::new(FakeIntent(intent)),
            llm.clone(),
            "PROMPT",
            "EMPTY",
        );

        let state = AppState::new(config, content, mailer.clone(), Arc::new(relay));
        Self { mailer, llm, state }
    }

    fn standard() -> Self {
        Self::build(
            RecordingMailer::default(),
            IntentBehavior::Match(matched("services.list", 0.9)),
            FakeLlm::default(),
        )
    }

    async fn call(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router(self.state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Value) {
        self.call(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    fn sent(&self) -> Vec<ContactEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }
}

fn matched(name: &str, confidence: f64) -> IntentMatch {
    IntentMatch {
        query_text: String::new(),
        intent_name: name.into(),
        confidence,
        fulfillment_text: "I build web and mobile apps.".into(),
    }
}

// ============ Contact ============

#[tokio::test]
async fn test_contact_missing_field_is_400_and_sends_nothing() {
    let h = Harness::standard();
    let (status, body) = h
        .post("/api/contact", json!({"name": "Ada", "email": "ada@example.com"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "All fields are required"}));
    assert!(h.sent().is_empty());
}

#[tokio::test]
async fn test_contact_invalid_email_is_400() {
    let h = Harness::standard();
    let (status, body) = h
        .post(
            "/api/contact",
            json!({"name": "Ada", "email": "not-an-email", "message": "Hi"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email address");
    assert!(h.sent().is_empty());
}

#[tokio::test]
async fn test_contact_success_sends_once() {
    let h = Harness::standard();
    let (status, body) = h
        .post(
            "/api/contact",
            json!({"name": "Ada", "email": "ada@example.com", "message": "Let's build something."}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Email sent successfully!"}));

    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply_to, "ada@example.com");
    assert_eq!(sent[0].to, "inbox@example.com");
    assert_eq!(sent[0].from_address, "relay@example.com");
    assert_eq!(sent[0].subject, "New Contact Form Message from Ada");
}

#[tokio::test]
async fn test_contact_smtp_failure_is_500_without_cause() {
    let h = Harness::build(
        RecordingMailer {
            fail: true,
            ..Default::default()
        },
        IntentBehavior::Match(matched("x", 1.0)),
        FakeLlm::default(),
    );
    let (status, body) = h
        .post(
            "/api/contact",
            json!({"name": "Ada", "email": "ada@example.com", "message": "Hi"}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Failed to send email. Please try again later."})
    );
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let h = Harness::standard();
    let (status, body) = h.post_raw("/api/contact", "{not json".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = h.post_raw("/api/chatbot", "[]".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============ Chat ============

#[tokio::test]
async fn test_chat_confident_match_answers_from_intent() {
    let h = Harness::standard();
    let (status, body) = h
        .post(
            "/api/chatbot",
            json!({"message": "What services do you offer?", "sessionId": "session-1"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "dialogflow");
    assert_eq!(body["response"], "I build web and mobile apps.");
    assert_eq!(body["intent"], "services.list");
    assert_eq!(body["confidence"], 0.9);
    assert_eq!(h.llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_low_confidence_answers_from_llm() {
    let h = Harness::build(
        RecordingMailer::default(),
        IntentBehavior::Match(matched("services.list", 0.3)),
        FakeLlm::default(),
    );
    let (status, body) = h
        .post(
            "/api/chatbot",
            json!({"message": "Do you know Rust?", "sessionId": "session-1"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "llm");
    assert_eq!(body["response"], "LLM answer to: Do you know Rust?");
    assert_eq!(body["confidence"], 1.0);
    assert!(body.get("intent").is_none());
    assert_eq!(h.llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chat_llm_failure_still_answers() {
    let h = Harness::build(
        RecordingMailer::default(),
        IntentBehavior::Match(matched("Default Fallback Intent", 0.0)),
        FakeLlm {
            fail: true,
            ..Default::default()
        },
    );
    let (status, body) = h
        .post("/api/chatbot", json!({"message": "??", "sessionId": "s"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "dialogflow");
    assert_eq!(body["response"], "I build web and mobile apps.");
}

#[tokio::test]
async fn test_chat_intent_failure_is_500_with_apology() {
    let h = Harness::build(
        RecordingMailer::default(),
        IntentBehavior::Fail,
        FakeLlm::default(),
    );
    let (status, body) = h
        .post("/api/chatbot", json!({"message": "hi", "sessionId": "s"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to process message");
    assert!(body["response"]
        .as_str()
        .unwrap()
        .starts_with("Sorry, I'm having technical difficulties."));
    assert_eq!(h.llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_missing_session_is_400() {
    let h = Harness::standard();
    let (status, body) = h.post("/api/chatbot", json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Message and sessionId are required"}));
}

// ============ Content ============

#[tokio::test]
async fn test_projects_are_featured_and_ordered() {
    let h = Harness::standard();
    let (status, body) = h.get("/api/projects").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["project-ledger", "project-tutor"]);
}

#[tokio::test]
async fn test_project_by_slug() {
    let h = Harness::standard();

    let (status, body) = h.get("/api/projects/ledger-dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Ledger Dashboard");

    let (status, body) = h.get("/api/projects/no-such-project").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_other_content_lists() {
    let h = Harness::standard();

    let (_, skills) = h.get("/api/skills").await;
    assert_eq!(skills.as_array().unwrap().len(), 3);

    let (_, tech) = h.get("/api/tech-stack").await;
    assert_eq!(tech[0]["name"], "React");

    let (_, testimonials) = h.get("/api/testimonials").await;
    let testimonials = testimonials.as_array().unwrap();
    assert_eq!(testimonials.len(), 1);
    assert_eq!(testimonials[0]["name"], "Ada Obi");
}

#[tokio::test]
async fn test_page_model() {
    let h = Harness::standard();
    let (status, page) = h.get("/api/page").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["nav"].as_array().unwrap().len(), 5);
    assert_eq!(page["skills"][1]["icon"], "Smartphone");
    assert_eq!(page["techStack"].as_array().unwrap().len(), 9);
    assert_eq!(page["projects"][0]["category"], "Full Stack");
    assert_eq!(page["services"].as_array().unwrap().len(), 7);
    assert_eq!(page["navScrollOffset"], 80);
    assert!(page["chatGreeting"].as_str().unwrap().starts_with("👋 Hi!"));
}

#[tokio::test]
async fn test_metadata_and_health() {
    let h = Harness::standard();

    let (status, meta) = h.get("/api/metadata").await;
    assert_eq!(status, StatusCode::OK);
    assert!(meta["title"].as_str().unwrap().starts_with("Francisco"));
    assert!(meta["structuredData"]["@graph"].is_array());

    let (status, health) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_record_with_null_title_is_still_served() {
    let store: MemoryStore = serde_json::from_value(json!({
        "projects": [
            {"_id": "ok", "title": "Good", "slug": {"current": "good"}, "featured": true, "order": 1},
            {"_id": "bad", "title": null, "slug": {"current": "bad"}, "featured": true, "order": 2}
        ],
        "testimonials": [
            {"_id": "anon", "name": null, "featured": true, "rating": 5}
        ]
    }))
    .unwrap();

    let relay = ChatRelay::new(
        Arc::new(FakeIntent(IntentBehavior::Fail)),
        Arc::new(FakeLlm::default()),
        "PROMPT",
        "EMPTY",
    );
    let state = AppState::new(
        Arc::new(Config::minimal()),
        Arc::new(store),
        Arc::new(RecordingMailer::default()),
        Arc::new(relay),
    );
    let h = Harness {
        mailer: Arc::new(RecordingMailer::default()),
        llm: Arc::new(FakeLlm::default()),
        state,
    };

    let (status, projects) = h.get("/api/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects.as_array().unwrap().len(), 2);
    assert_eq!(projects[1]["title"], "");

    let (status, testimonials) = h.get("/api/testimonials").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(testimonials.as_array().unwrap().len(), 1);

    let (status, _) = h.get("/api/page").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_state_builds_without_chat_credentials() {
    let mut config = Config::minimal();
    config.smtp.host = Some("smtp.example.com".into());
    config.smtp.user = Some("relay@example.com".into());
    config.smtp.password = Some("secret".into());

    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content.json");
    assert!(AppState::from_config(&config, Some(&fixture)).is_ok());
    assert!(AppState::from_config(&Config::minimal(), Some(&fixture)).is_ok());
}
