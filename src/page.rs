//! Page model assembly.
//!
//! Builds the data behind every section of the single-page site. Each
//! section is a pure function of the fetched records plus the static site
//! content; the four content queries run concurrently.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::content::{image_url, report_violations, ContentStore};
use crate::icons::{self, Icon};
use crate::models::{Project, Skill, TechStackItem, Testimonial};
use crate::site::{self, Highlight, NavItem, Service, SocialLink, Stat};

/// Copies of the tech stack laid end to end so the marquee loops seamlessly.
pub const MARQUEE_COPIES: usize = 3;
/// Square size of testimonial avatars.
pub const AVATAR_PX: u32 = 160;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel {
    pub nav: Vec<NavItem>,
    pub nav_scroll_offset: u32,
    pub hero: HeroSection,
    pub about: AboutSection,
    pub skills: Vec<SkillCard>,
    pub tech_stack: Vec<TechLogo>,
    pub projects: Vec<ProjectCard>,
    pub testimonials: Vec<TestimonialCard>,
    pub services: Vec<Service>,
    pub contact: ContactSection,
    /// First bot message of the chat widget.
    pub chat_greeting: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSection {
    pub headlines: Vec<Vec<Highlight>>,
    pub rotation_secs: u64,
    pub socials: Vec<SocialLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutSection {
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillCard {
    pub title: String,
    pub icon: Icon,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechLogo {
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: String,
    pub title: String,
    pub slug: Option<String>,
    pub category: Option<&'static str>,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub gallery_urls: Vec<String>,
    pub live_url: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialCard {
    pub name: String,
    pub role: String,
    pub company: Option<String>,
    pub image_url: Option<String>,
    pub quote: String,
    pub stars: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSection {
    pub email: String,
    pub location: String,
    pub endpoint: &'static str,
}

/// Resolves image references to CDN URLs for the configured dataset.
struct Images<'a> {
    project_id: Option<&'a str>,
    dataset: &'a str,
}

impl Images<'_> {
    fn url(&self, reference: Option<&str>, size: Option<u32>) -> Option<String> {
        let project_id = self.project_id?;
        let reference = reference?;
        match image_url(project_id, self.dataset, reference, size, size) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unresolvable image");
                None
            }
        }
    }
}

pub fn skill_cards(skills: &[Skill]) -> Vec<SkillCard> {
    skills
        .iter()
        .map(|s| SkillCard {
            title: s.title.clone(),
            icon: icons::resolve(&s.icon),
            description: s.description.clone(),
        })
        .collect()
}

fn tech_logos(items: &[TechStackItem], images: &Images<'_>) -> Vec<TechLogo> {
    let once: Vec<TechLogo> = items
        .iter()
        .map(|t| TechLogo {
            name: t.name.clone(),
            logo_url: images.url(t.logo.as_ref().and_then(|l| l.asset_ref()), None),
        })
        .collect();

    let mut looped = Vec::with_capacity(once.len() * MARQUEE_COPIES);
    for _ in 0..MARQUEE_COPIES {
        looped.extend(once.iter().cloned());
    }
    looped
}

fn project_cards(projects: &[Project], images: &Images<'_>) -> Vec<ProjectCard> {
    projects
        .iter()
        .map(|p| ProjectCard {
            id: p.id.clone(),
            title: p.title.clone(),
            slug: p.slug().map(String::from),
            category: p.category.map(|c| c.label()),
            description: p.description.clone(),
            thumbnail_url: images.url(p.thumbnail.as_ref().and_then(|i| i.asset_ref()), None),
            gallery_urls: p
                .images
                .iter()
                .filter_map(|i| images.url(i.asset_ref(), None))
                .collect(),
            live_url: p.live_url.clone(),
            technologies: p.technologies.clone(),
        })
        .collect()
}

fn testimonial_cards(items: &[Testimonial], images: &Images<'_>) -> Vec<TestimonialCard> {
    items
        .iter()
        .map(|t| TestimonialCard {
            name: t.name.clone(),
            role: t.role.clone(),
            company: t.company.clone(),
            image_url: images.url(t.image.as_ref().and_then(|i| i.asset_ref()), Some(AVATAR_PX)),
            quote: t.testimonial.clone(),
            stars: t.stars(),
        })
        .collect()
}

/// Fetch content and assemble every section.
pub async fn build_page(store: &dyn ContentStore, config: &Config) -> Result<PageModel> {
    let (projects, skills, tech_stack, testimonials) = tokio::try_join!(
        store.projects(),
        store.skills(),
        store.tech_stack(),
        store.testimonials()
    )?;

    report_violations("project", &projects, |p| p.id.as_str(), Project::validate);
    report_violations("skill", &skills, |s| s.id.as_str(), Skill::validate);
    report_violations("techStack", &tech_stack, |t| t.id.as_str(), TechStackItem::validate);
    report_violations("testimonial", &testimonials, |t| t.id.as_str(), Testimonial::validate);

    let images = Images {
        project_id: config.content.project_id.as_deref(),
        dataset: &config.content.dataset,
    };
    let site_cfg = &config.site;

    Ok(PageModel {
        nav: site::NAV_ITEMS.to_vec(),
        nav_scroll_offset: site::NAV_SCROLL_OFFSET,
        hero: HeroSection {
            headlines: site::hero_headlines(),
            rotation_secs: site::HERO_ROTATION_SECS,
            socials: site::social_links(site_cfg),
        },
        about: AboutSection {
            stats: site::ABOUT_STATS.to_vec(),
        },
        skills: skill_cards(&skills),
        tech_stack: tech_logos(&tech_stack, &images),
        projects: project_cards(&projects, &images),
        testimonials: testimonial_cards(&testimonials, &images),
        services: site::services(),
        contact: ContactSection {
            email: site_cfg.email.clone(),
            location: site_cfg.country.clone(),
            endpoint: "/api/contact",
        },
        chat_greeting: site::chat_greeting(site_cfg),
    })
}
