//! Configuration parsing.
//!
//! Non-secret settings live in a TOML file (default `./config/folio.toml`).
//! Credentials and endpoint ids are read from the environment and override
//! anything written in the file, so a deployment can ship the file without
//! secrets:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SMTP_HOST` / `SMTP_PORT` / `SMTP_SECURE` | `[smtp]` host, port, secure |
//! | `SMTP_USER` / `SMTP_PASS` | `[smtp]` user, password |
//! | `DIALOGFLOW_PROJECT_ID` / `DIALOGFLOW_LANGUAGE_CODE` | `[intent]` |
//! | `DIALOGFLOW_ACCESS_TOKEN` | `[intent].access_token` |
//! | `GROQ_API_KEY` | `[llm].api_key` |
//! | `SANITY_PROJECT_ID` / `SANITY_DATASET` / `SANITY_API_TOKEN` | `[content]` |
//!
//! Missing credentials are not a load error. The backend that needs them
//! fails at call time, which the relays turn into their usual 500 response.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub intent: IntentConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of the compact human format.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Identity of the site owner, used by metadata, JSON-LD and the chat prompt.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default = "default_job_title")]
    pub job_title: String,
    #[serde(default = "default_owner_email")]
    pub email: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_same_as")]
    pub same_as: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            owner: default_owner(),
            brand: default_brand(),
            job_title: default_job_title(),
            email: default_owner_email(),
            country: default_country(),
            same_as: default_same_as(),
        }
    }
}

fn default_base_url() -> String {
    "https://buildwithyehhmii.vercel.app".to_string()
}
fn default_owner() -> String {
    "Francisco".to_string()
}
fn default_brand() -> String {
    "YEHHMII".to_string()
}
fn default_job_title() -> String {
    "Full-Stack Developer & Software Engineer".to_string()
}
fn default_owner_email() -> String {
    "franciscoabhulimen@gmail.com".to_string()
}
fn default_country() -> String {
    "Nigeria".to_string()
}
fn default_same_as() -> Vec<String> {
    vec![
        "https://github.com/Yehhmii".to_string(),
        "https://twitter.com/yehhmii".to_string(),
    ]
}

/// Headless content store (Sanity) settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_true")]
    pub use_cdn: bool,
    /// Full query URL override (e.g. a local mock). Replaces the
    /// `https://{project}.api.sanity.io/...` URL when set.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: default_dataset(),
            api_version: default_api_version(),
            use_cdn: true,
            endpoint: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_dataset() -> String {
    "production".to_string()
}
fn default_api_version() -> String {
    "2024-01-01".to_string()
}
fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise.
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            secure: false,
            user: None,
            password: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContactConfig {
    /// Inbox for form submissions. Defaults to the SMTP user.
    #[serde(default)]
    pub recipient: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IntentConfig {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_dialogflow_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            language_code: default_language_code(),
            access_token: None,
            endpoint: default_dialogflow_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_language_code() -> String {
    "en".to_string()
}
fn default_dialogflow_endpoint() -> String {
    "https://dialogflow.googleapis.com/v2".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}
fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Intent matches below this confidence go to the LLM.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Replaces the built-in system prompt when set.
    #[serde(default)]
    pub system_prompt_file: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            system_prompt_file: None,
        }
    }
}

fn default_confidence_threshold() -> f64 {
    crate::chat::DEFAULT_CONFIDENCE_THRESHOLD
}

impl Config {
    /// A config with every default and nothing read from disk or env.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Overlay environment variables onto the file values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup. Blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SMTP_HOST") {
            self.smtp.host = Some(v);
        }
        if let Some(v) = get("SMTP_PORT") {
            self.smtp.port = v
                .trim()
                .parse()
                .with_context(|| format!("SMTP_PORT is not a valid port: {}", v))?;
        }
        if let Some(v) = get("SMTP_SECURE") {
            self.smtp.secure = v.trim() == "true";
        }
        if let Some(v) = get("SMTP_USER") {
            self.smtp.user = Some(v);
        }
        if let Some(v) = get("SMTP_PASS") {
            self.smtp.password = Some(v);
        }
        if let Some(v) = get("DIALOGFLOW_PROJECT_ID") {
            self.intent.project_id = Some(v);
        }
        if let Some(v) = get("DIALOGFLOW_LANGUAGE_CODE") {
            self.intent.language_code = v;
        }
        if let Some(v) = get("DIALOGFLOW_ACCESS_TOKEN") {
            self.intent.access_token = Some(v);
        }
        if let Some(v) = get("GROQ_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("SANITY_PROJECT_ID") {
            self.content.project_id = Some(v);
        }
        if let Some(v) = get("SANITY_DATASET") {
            self.content.dataset = v;
        }
        if let Some(v) = get("SANITY_API_TOKEN") {
            self.content.token = Some(v);
        }
        Ok(())
    }

    /// Address that receives contact-form mail.
    pub fn contact_recipient(&self) -> Option<&str> {
        self.contact
            .recipient
            .as_deref()
            .or(self.smtp.user.as_deref())
    }
}

/// Read, parse and validate the config file, then overlay the environment.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.apply_env()?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields defaults plus environment.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    let mut config = Config::minimal();
    config.apply_env()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(0.0..=1.0).contains(&config.chat.confidence_threshold) {
        bail!("chat.confidence_threshold must be in [0.0, 1.0]");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        bail!("llm.temperature must be in [0.0, 2.0]");
    }

    if config.llm.max_tokens == 0 {
        bail!("llm.max_tokens must be > 0");
    }

    if config.content.dataset.trim().is_empty() {
        bail!("content.dataset must not be empty");
    }

    if config.server.bind.trim().is_empty() {
        bail!("server.bind must not be empty");
    }

    Ok(())
}
