//! HTTP server.
//!
//! Serves the two relays the site's forms post to, plus read-only content
//! and page endpoints for the front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/contact` | Email a contact-form submission |
//! | `POST` | `/api/chatbot` | Answer a chat message (intent → LLM fallback) |
//! | `GET`  | `/api/projects` | Featured projects |
//! | `GET`  | `/api/projects/{slug}` | One project by slug |
//! | `GET`  | `/api/skills` | Skills |
//! | `GET`  | `/api/tech-stack` | Tech stack |
//! | `GET`  | `/api/testimonials` | Featured testimonials |
//! | `GET`  | `/api/page` | Assembled page model |
//! | `GET`  | `/api/metadata` | SEO metadata and JSON-LD |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Errors carry a fixed human-readable message and nothing machine-readable:
//!
//! ```json
//! { "error": "All fields are required" }
//! ```
//!
//! The chat relay's 500 additionally carries a `response` the widget can
//! show in place of a reply. Downstream causes are logged, never returned.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::{self, ChatRelay};
use crate::config::Config;
use crate::contact::{self, ContactSettings};
use crate::content::{report_violations, ContentStore, MemoryStore, SanityClient};
use crate::error::RelayError;
use crate::mailer::{Mailer, SmtpMailer, UnconfiguredMailer};
use crate::models::{
    ChatReply, ChatRequest, ContactRequest, Project, Skill, TechStackItem, Testimonial,
};
use crate::page::{build_page, PageModel};
use crate::site::{self, SiteMetadata};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    content: Arc<dyn ContentStore>,
    mailer: Arc<dyn Mailer>,
    chat: Arc<ChatRelay>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        content: Arc<dyn ContentStore>,
        mailer: Arc<dyn Mailer>,
        chat: Arc<ChatRelay>,
    ) -> Self {
        Self {
            config,
            content,
            mailer,
            chat,
        }
    }

    /// Wire the production backends from configuration.
    ///
    /// With `fixture`, content is served from that JSON file instead of the
    /// CMS. Missing SMTP, Dialogflow or Groq settings leave the affected
    /// relay answering 500 rather than failing startup. Without a fixture, a
    /// missing content project is a startup error.
    pub fn from_config(config: &Config, fixture: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let config = Arc::new(config.clone());

        let content: Arc<dyn ContentStore> = match fixture {
            Some(path) => {
                tracing::info!(path = %path.display(), "serving content from fixture");
                Arc::new(MemoryStore::from_json_file(path)?)
            }
            None => Arc::new(SanityClient::new(&config.content)?),
        };

        let mailer: Arc<dyn Mailer> = match SmtpMailer::new(&config.smtp) {
            Ok(m) => Arc::new(m),
            Err(e) => {
                tracing::warn!(error = %e, "SMTP not configured; contact form will fail");
                Arc::new(UnconfiguredMailer)
            }
        };

        let relay = ChatRelay::from_config(&config)?;

        Ok(Self::new(config, content, mailer, Arc::new(relay)))
    }
}

/// Build the router with all routes and layers.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/contact", post(handle_contact))
        .route("/api/chatbot", post(handle_chatbot))
        .route("/api/projects", get(handle_projects))
        .route("/api/projects/{slug}", get(handle_project_by_slug))
        .route("/api/skills", get(handle_skills))
        .route("/api/tech-stack", get(handle_tech_stack))
        .route("/api/testimonials", get(handle_testimonials))
        .route("/api/page", get(handle_page))
        .route("/api/metadata", get(handle_metadata))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config, fixture: Option<&std::path::Path>) -> anyhow::Result<()> {
    let state = AppState::from_config(config, fixture)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "portfolio server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    response: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            response: self.response,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
        response: None,
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: message.into(),
        response: None,
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
        response: None,
    }
}

/// Map a relay error: client errors pass their message through, downstream
/// failures are logged and replaced by `public_message`.
fn relay_error(route: &str, err: RelayError, public_message: &str) -> AppError {
    match err {
        RelayError::InvalidInput(msg) => bad_request(msg),
        RelayError::Downstream(cause) => {
            tracing::error!(route, error = %format!("{:#}", cause), "relay failed");
            internal(public_message)
        }
    }
}

fn content_error(what: &str, err: anyhow::Error) -> AppError {
    tracing::error!(what, error = %format!("{:#}", err), "content query failed");
    internal(format!("Failed to load {}", what))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected request body");
            Err(bad_request("Invalid JSON body"))
        }
    }
}

// ============ POST /api/contact ============

#[derive(Serialize)]
struct ContactResponse {
    message: &'static str,
}

async fn handle_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    const SEND_FAILED: &str = "Failed to send email. Please try again later.";

    let req = json_body(body)?;
    let recipient = state
        .config
        .contact_recipient()
        .map(String::from)
        .unwrap_or_default();
    let settings = ContactSettings {
        sender: state.config.smtp.user.clone().unwrap_or_else(|| recipient.clone()),
        recipient,
    };

    contact::submit_contact(state.mailer.as_ref(), &settings, req)
        .await
        .map_err(|e| relay_error("contact", e, SEND_FAILED))?;

    Ok(Json(ContactResponse {
        message: contact::SENT,
    }))
}

// ============ POST /api/chatbot ============

async fn handle_chatbot(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let req = json_body(body)?;
    match state.chat.respond(req).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            let mut err = relay_error("chatbot", e, chat::PROCESSING_FAILED);
            if err.status == StatusCode::INTERNAL_SERVER_ERROR {
                err.response = Some(site::chat_apology(&state.config.site));
            }
            Err(err)
        }
    }
}

// ============ Content ============

async fn handle_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    let items = state
        .content
        .projects()
        .await
        .map_err(|e| content_error("projects", e))?;
    report_violations("project", &items, |p| p.id.as_str(), Project::validate);
    Ok(Json(items))
}

async fn handle_project_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Project>, AppError> {
    state
        .content
        .project_by_slug(&slug)
        .await
        .map_err(|e| content_error("project", e))?
        .map(Json)
        .ok_or_else(|| not_found(format!("Project not found: {}", slug)))
}

async fn handle_skills(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, AppError> {
    let items = state
        .content
        .skills()
        .await
        .map_err(|e| content_error("skills", e))?;
    report_violations("skill", &items, |s| s.id.as_str(), Skill::validate);
    Ok(Json(items))
}

async fn handle_tech_stack(
    State(state): State<AppState>,
) -> Result<Json<Vec<TechStackItem>>, AppError> {
    let items = state
        .content
        .tech_stack()
        .await
        .map_err(|e| content_error("tech stack", e))?;
    report_violations("techStack", &items, |t| t.id.as_str(), TechStackItem::validate);
    Ok(Json(items))
}

async fn handle_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, AppError> {
    let items = state
        .content
        .testimonials()
        .await
        .map_err(|e| content_error("testimonials", e))?;
    report_violations("testimonial", &items, |t| t.id.as_str(), Testimonial::validate);
    Ok(Json(items))
}

async fn handle_page(State(state): State<AppState>) -> Result<Json<PageModel>, AppError> {
    build_page(state.content.as_ref(), &state.config)
        .await
        .map(Json)
        .map_err(|e| content_error("page", e))
}

async fn handle_metadata(State(state): State<AppState>) -> Json<SiteMetadata> {
    Json(site::metadata(&state.config.site))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
