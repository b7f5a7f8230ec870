//! Core data models.
//!
//! Content records mirror the documents held in the headless store and
//! deserialize straight from its JSON (`_id`, camelCase keys). GROQ
//! projections return `null` for absent fields, so list and flag fields use
//! [`null_as_default`] rather than plain `#[serde(default)]`.
//!
//! The chat and contact request/response bodies used by the HTTP relays
//! live here too.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` (or a missing field, with `#[serde(default)]`) as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============ Content records ============

/// Reference to an uploaded asset, e.g. `image-Tb9Ew8CX-2000x3000-jpg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// Focal point chosen by the editor, in the unit square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
}

impl Image {
    pub fn asset_ref(&self) -> Option<&str> {
        self.asset.as_ref().map(|a| a.reference.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// Project categories offered in the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectCategory {
    FullStack,
    Mobile,
    WebApp,
    DataViz,
    Ml,
    WebDev,
    #[serde(other)]
    Other,
}

impl ProjectCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectCategory::FullStack => "Full Stack",
            ProjectCategory::Mobile => "Mobile Development",
            ProjectCategory::WebApp => "Web Application",
            ProjectCategory::DataViz => "Data Visualization",
            ProjectCategory::Ml => "Machine Learning",
            ProjectCategory::WebDev => "Web Development",
            ProjectCategory::Other => "Other",
        }
    }
}

pub const MAX_GALLERY_IMAGES: usize = 5;
pub const TESTIMONIAL_MIN_CHARS: usize = 50;
pub const TESTIMONIAL_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub category: Option<ProjectCategory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default)]
    pub order: Option<i64>,
}

impl Project {
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_ref().map(|s| s.current.as_str())
    }

    /// Schema violations, empty when the record is well-formed.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        require(&mut problems, "title", &self.title);
        require(&mut problems, "description", &self.description);
        if self.slug().map_or(true, |s| s.trim().is_empty()) {
            problems.push("slug is required".to_string());
        }
        if self.category.is_none() {
            problems.push("category is required".to_string());
        }
        if self.thumbnail.is_none() {
            problems.push("thumbnail is required".to_string());
        }
        if self.images.len() > MAX_GALLERY_IMAGES {
            problems.push(format!(
                "at most {} gallery images allowed, found {}",
                MAX_GALLERY_IMAGES,
                self.images.len()
            ));
        }
        check_order(&mut problems, self.order, false);
        problems
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Icon name resolved through [`crate::icons`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub order: Option<i64>,
}

impl Skill {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        require(&mut problems, "title", &self.title);
        require(&mut problems, "icon", &self.icon);
        require(&mut problems, "description", &self.description);
        check_order(&mut problems, self.order, true);
        problems
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechStackItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub logo: Option<Image>,
    #[serde(default)]
    pub order: Option<i64>,
}

impl TechStackItem {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        require(&mut problems, "name", &self.name);
        if self.logo.is_none() {
            problems.push("logo is required".to_string());
        }
        check_order(&mut problems, self.order, true);
        problems
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub image: Option<Image>,
    /// The quote itself.
    #[serde(default, deserialize_with = "null_as_default")]
    pub testimonial: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default)]
    pub order: Option<i64>,
}

impl Testimonial {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        require(&mut problems, "name", &self.name);
        require(&mut problems, "role", &self.role);
        if self.image.is_none() {
            problems.push("image is required".to_string());
        }
        let len = self.testimonial.chars().count();
        if !(TESTIMONIAL_MIN_CHARS..=TESTIMONIAL_MAX_CHARS).contains(&len) {
            problems.push(format!(
                "testimonial must be {}-{} characters, found {}",
                TESTIMONIAL_MIN_CHARS, TESTIMONIAL_MAX_CHARS, len
            ));
        }
        match self.rating {
            Some(r) if (1.0..=5.0).contains(&r) => {}
            Some(r) => problems.push(format!("rating must be 1-5, found {}", r)),
            None => problems.push("rating is required".to_string()),
        }
        check_order(&mut problems, self.order, false);
        problems
    }

    /// Star count for display, clamped into 0..=5.
    pub fn stars(&self) -> u8 {
        self.rating.unwrap_or(0.0).round().clamp(0.0, 5.0) as u8
    }
}

fn require(problems: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{} is required", field));
    }
}

fn check_order(problems: &mut Vec<String>, order: Option<i64>, required: bool) {
    match order {
        Some(n) if n <= 0 => problems.push(format!("order must be positive, found {}", n)),
        None if required => problems.push("order is required".to_string()),
        _ => {}
    }
}

// ============ Relay bodies ============

/// `POST /api/contact` body. Fields are optional so that a missing field is
/// reported as our own 400 rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/chatbot` body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Which backend produced a chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSource {
    Dialogflow,
    Llm,
}

/// Successful `POST /api/chatbot` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub source: ChatSource,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}
