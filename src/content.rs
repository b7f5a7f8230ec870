//! Content retrieval from the headless document store.
//!
//! Every section of the page reads its records through the [`ContentStore`]
//! trait. Two implementations ship with the crate:
//!
//! - **[`SanityClient`]** issues GROQ queries against the Sanity HTTP
//!   query API (`/v{apiVersion}/data/query/{dataset}`).
//! - **[`MemoryStore`]** holds records in memory and applies the same
//!   filters and ordering. Used by tests and by `folio content --fixture`.
//!
//! All list queries are sorted by the `order` field ascending. Projects and
//! testimonials are additionally restricted to `featured == true`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::config::ContentConfig;
use crate::models::{Project, Skill, TechStackItem, Testimonial};

pub const PROJECTS_QUERY: &str = r#"*[_type == "project" && featured == true] | order(order asc) {
  _id,
  title,
  slug,
  category,
  description,
  thumbnail,
  images,
  liveUrl,
  technologies,
  featured,
  order
}"#;

pub const SKILLS_QUERY: &str = r#"*[_type == "skill"] | order(order asc) {
  _id,
  title,
  icon,
  description,
  order
}"#;

pub const TECH_STACK_QUERY: &str = r#"*[_type == "techStack"] | order(order asc) {
  _id,
  name,
  logo,
  order
}"#;

pub const TESTIMONIALS_QUERY: &str = r#"*[_type == "testimonial" && featured == true] | order(order asc) {
  _id,
  name,
  role,
  company,
  image,
  testimonial,
  rating,
  featured,
  order
}"#;

pub const PROJECT_BY_SLUG_QUERY: &str = r#"*[_type == "project" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  category,
  description,
  thumbnail,
  images,
  liveUrl,
  technologies,
  featured,
  order
}"#;

/// Read-only access to the site's content records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Featured projects, by `order`.
    async fn projects(&self) -> Result<Vec<Project>>;
    async fn skills(&self) -> Result<Vec<Skill>>;
    async fn tech_stack(&self) -> Result<Vec<TechStackItem>>;
    /// Featured testimonials, by `order`.
    async fn testimonials(&self) -> Result<Vec<Testimonial>>;
    /// Any project (featured or not) whose slug matches.
    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>>;
}

// ============ Sanity ============

/// Envelope returned by the query API.
#[derive(Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// GROQ client for the Sanity HTTP query API.
pub struct SanityClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl SanityClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `content.endpoint` nor a project id
    /// (`SANITY_PROJECT_ID`) is configured.
    pub fn new(config: &ContentConfig) -> Result<Self> {
        let url = match (&config.endpoint, &config.project_id) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(project_id)) => query_url(
                project_id,
                &config.dataset,
                &config.api_version,
                config.use_cdn && config.token.is_none(),
            ),
            (None, None) => {
                bail!("content.project_id (SANITY_PROJECT_ID) or content.endpoint must be set")
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url,
            token: config.token.clone(),
        })
    }

    /// Run a GROQ query. `params` are bound as `$name` and JSON-encoded.
    pub async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), groq.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        let mut request = self.http.get(&self.url).query(&pairs);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .with_context(|| format!("content query failed: {}", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("content store error ({}): {}", status, body);
        }

        let envelope: QueryResponse<T> = resp
            .json()
            .await
            .with_context(|| "failed to decode content query response")?;
        Ok(envelope.result)
    }
}

/// `https://{project}.api.sanity.io/v{version}/data/query/{dataset}`; the
/// `apicdn` host is used when `cdn` is true.
pub fn query_url(project_id: &str, dataset: &str, api_version: &str, cdn: bool) -> String {
    let host = if cdn { "apicdn" } else { "api" };
    let version = api_version.trim_start_matches('v');
    format!(
        "https://{}.{}.sanity.io/v{}/data/query/{}",
        project_id, host, version, dataset
    )
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn projects(&self) -> Result<Vec<Project>> {
        self.query(PROJECTS_QUERY, &[]).await
    }

    async fn skills(&self) -> Result<Vec<Skill>> {
        self.query(SKILLS_QUERY, &[]).await
    }

    async fn tech_stack(&self) -> Result<Vec<TechStackItem>> {
        self.query(TECH_STACK_QUERY, &[]).await
    }

    async fn testimonials(&self) -> Result<Vec<Testimonial>> {
        self.query(TESTIMONIALS_QUERY, &[]).await
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        self.query(PROJECT_BY_SLUG_QUERY, &[("slug", slug)]).await
    }
}

// ============ In-memory ============

/// Records held in memory. Filtering and ordering match the GROQ queries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStore {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub tech_stack: Vec<TechStackItem>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON fixture with `projects`, `skills`, `techStack` and
    /// `testimonials` arrays.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content fixture: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse content fixture: {}", path.display()))
    }
}

/// Stable sort by `order` ascending; records without an order go last.
pub fn sort_by_order<T>(items: &mut [T], order: impl Fn(&T) -> Option<i64>) {
    items.sort_by_key(|item| (order(item).is_none(), order(item).unwrap_or(0)));
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn projects(&self) -> Result<Vec<Project>> {
        let mut items: Vec<Project> =
            self.projects.iter().filter(|p| p.featured).cloned().collect();
        sort_by_order(&mut items, |p| p.order);
        Ok(items)
    }

    async fn skills(&self) -> Result<Vec<Skill>> {
        let mut items = self.skills.clone();
        sort_by_order(&mut items, |s| s.order);
        Ok(items)
    }

    async fn tech_stack(&self) -> Result<Vec<TechStackItem>> {
        let mut items = self.tech_stack.clone();
        sort_by_order(&mut items, |t| t.order);
        Ok(items)
    }

    async fn testimonials(&self) -> Result<Vec<Testimonial>> {
        let mut items: Vec<Testimonial> = self
            .testimonials
            .iter()
            .filter(|t| t.featured)
            .cloned()
            .collect();
        sort_by_order(&mut items, |t| t.order);
        Ok(items)
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        Ok(self
            .projects
            .iter()
            .find(|p| p.slug() == Some(slug))
            .cloned())
    }
}

/// Log schema violations without dropping the records.
pub fn report_violations<T>(
    kind: &str,
    items: &[T],
    id: impl Fn(&T) -> &str,
    check: impl Fn(&T) -> Vec<String>,
) {
    for item in items {
        let problems = check(item);
        if !problems.is_empty() {
            tracing::warn!(
                kind,
                id = id(item),
                problems = ?problems,
                "content record fails schema"
            );
        }
    }
}

// ============ Image URLs ============

/// Parsed asset reference `image-<id>-<w>x<h>-<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl ImageAsset {
    pub fn parse(reference: &str) -> Result<Self> {
        let rest = reference
            .strip_prefix("image-")
            .with_context(|| format!("invalid image reference: {}", reference))?;

        let (rest, format) = rest
            .rsplit_once('-')
            .with_context(|| format!("invalid image reference: {}", reference))?;
        let (id, dims) = rest
            .rsplit_once('-')
            .with_context(|| format!("invalid image reference: {}", reference))?;
        let (w, h) = dims
            .split_once('x')
            .with_context(|| format!("invalid image dimensions in: {}", reference))?;

        if id.is_empty() || format.is_empty() {
            bail!("invalid image reference: {}", reference);
        }

        Ok(Self {
            id: id.to_string(),
            width: w
                .parse()
                .with_context(|| format!("invalid image width in: {}", reference))?,
            height: h
                .parse()
                .with_context(|| format!("invalid image height in: {}", reference))?,
            format: format.to_string(),
        })
    }
}

/// CDN URL for an image reference, optionally resized.
pub fn image_url(
    project_id: &str,
    dataset: &str,
    reference: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<String> {
    let asset = ImageAsset::parse(reference)?;
    let mut url = format!(
        "https://cdn.sanity.io/images/{}/{}/{}-{}x{}.{}",
        project_id, dataset, asset.id, asset.width, asset.height, asset.format
    );

    let mut params = Vec::new();
    if let Some(w) = width {
        params.push(format!("w={}", w));
    }
    if let Some(h) = height {
        params.push(format!("h={}", h));
    }
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    Ok(url)
}
