//! Static site content and metadata.
//!
//! Everything here is fixed at build time: the services list, navigation,
//! hero headlines, about-section counters, social links, SEO tags, the
//! schema.org JSON-LD graph, and the chat assistant's system prompt. Values
//! that identify the owner come from [`SiteConfig`].

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::icons::Icon;

/// Which side of the services timeline a card sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub icon: Icon,
    pub position: Side,
}

pub fn services() -> Vec<Service> {
    let raw: [(&str, &str, &str, Icon); 7] = [
        (
            "Web Applications",
            "Full-stack web applications built with modern frameworks and best practices. Scalable, secure, and optimized for performance that drives real business results.",
            "/services/web-app.jpg",
            Icon::Globe,
        ),
        (
            "Websites",
            "Beautiful, responsive websites that convert visitors into customers. From landing pages to complex multi-page sites, crafted with attention to every detail.",
            "/services/website.jpg",
            Icon::Monitor,
        ),
        (
            "Mobile Apps",
            "Native and cross-platform mobile applications for iOS and Android. Intuitive interfaces with seamless user experiences that keep users engaged.",
            "/services/mobile-app.jpg",
            Icon::Smartphone,
        ),
        (
            "AI Applications",
            "Intelligent applications powered by machine learning and AI. From chatbots to predictive analytics, bringing the future of technology to your business.",
            "/services/ai-app.jpg",
            Icon::Cpu,
        ),
        (
            "Data Analysis",
            "Transform raw data into actionable insights. Data visualization, reporting, and business intelligence solutions that drive informed decision-making.",
            "/services/data-analysis.jpg",
            Icon::BarChart3,
        ),
        (
            "Automation",
            "Streamline your workflows with custom automation solutions. Save time, reduce errors, and boost productivity with intelligent automation systems.",
            "/services/automation.jpg",
            Icon::Workflow,
        ),
        (
            "And More",
            "Custom solutions tailored to your unique needs. API development, cloud integration, consulting, technical writing, and specialized services to meet your goals.",
            "/services/more.jpg",
            Icon::Sparkles,
        ),
    ];

    raw.into_iter()
        .enumerate()
        .map(|(i, (title, description, image, icon))| Service {
            id: i as u32 + 1,
            title,
            description,
            image,
            icon,
            // Timeline alternates, starting on the right.
            position: if i % 2 == 0 { Side::Right } else { Side::Left },
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub name: &'static str,
    /// Section element id to scroll to.
    pub href: &'static str,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem { name: "About", href: "about" },
    NavItem { name: "Skills", href: "skills" },
    NavItem { name: "Projects", href: "projects" },
    NavItem { name: "Services", href: "services" },
    NavItem { name: "Contact", href: "contact" },
];

/// Scroll offset applied when jumping to a section, for the fixed navbar.
pub const NAV_SCROLL_OFFSET: u32 = 80;

#[derive(Debug, Clone, Serialize)]
pub struct Stat {
    pub label: &'static str,
    pub end: u32,
    pub suffix: &'static str,
}

pub const ABOUT_STATS: [Stat; 3] = [
    Stat { label: "Projects Completed", end: 37, suffix: "+" },
    Stat { label: "Satisfied Clients", end: 12, suffix: "+" },
    Stat { label: "Technologies Mastered", end: 25, suffix: "+" },
];

/// One span of a hero headline; `accent` spans are drawn in the brand color.
#[derive(Debug, Clone, Serialize)]
pub struct Highlight {
    pub word: &'static str,
    pub accent: bool,
}

const fn plain(word: &'static str) -> Highlight {
    Highlight { word, accent: false }
}

const fn accent(word: &'static str) -> Highlight {
    Highlight { word, accent: true }
}

pub const HERO_ROTATION_SECS: u64 = 5;

pub fn hero_headlines() -> Vec<Vec<Highlight>> {
    vec![
        vec![
            plain("Building the future with "),
            accent("clean code"),
            plain(", "),
            accent("bold ideas"),
            plain(", and a passion for "),
            accent("meaningful impact"),
            plain("."),
        ],
        vec![
            plain("Crafting digital experiences that blend "),
            accent("technology"),
            plain(" with "),
            accent("human-centered design"),
            plain(" and "),
            accent("strategic thinking"),
            plain("."),
        ],
        vec![
            plain("A full-stack developer who builds systems that "),
            accent("scale"),
            plain(", products that "),
            accent("feel right"),
            plain(", and experiences rooted in "),
            accent("cultural context"),
            plain("."),
        ],
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
}

pub fn social_links(site: &SiteConfig) -> Vec<SocialLink> {
    let mut links: Vec<SocialLink> = site
        .same_as
        .iter()
        .map(|href| SocialLink {
            label: social_label(href).to_string(),
            href: href.clone(),
        })
        .collect();
    links.push(SocialLink {
        label: "Email".to_string(),
        href: format!("mailto:{}", site.email),
    });
    links
}

fn social_label(href: &str) -> &'static str {
    if href.contains("github.com") {
        "GitHub"
    } else if href.contains("linkedin.com") {
        "LinkedIn"
    } else if href.contains("twitter.com") || href.contains("x.com") {
        "Twitter"
    } else if href.contains("tiktok.com") {
        "TikTok"
    } else {
        "Website"
    }
}

// ============ SEO ============

pub const KEYWORDS: [&str; 19] = [
    "full-stack developer",
    "software engineer",
    "web developer",
    "React developer",
    "Next.js developer",
    "Node.js developer",
    "TypeScript developer",
    "Python developer",
    "mobile app developer",
    "AI integration",
    "automation solutions",
    "API development",
    "Nigeria developer",
    "freelance developer",
    "remote developer",
    "web applications",
    "mobile apps",
    "AI solutions",
    "data analysis",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    pub title: String,
    /// `%s` is replaced by a page title.
    pub title_template: String,
    pub description: String,
    pub keywords: Vec<&'static str>,
    pub canonical_url: String,
    pub open_graph: OpenGraph,
    pub structured_data: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
    pub title: String,
    pub description: String,
    pub site_name: String,
    pub locale: &'static str,
}

fn site_description(site: &SiteConfig) -> String {
    format!(
        "Full-stack developer specializing in web applications, mobile apps, AI solutions, and automation. \
         Expert in React, Next.js, Node.js, Python, and modern technologies. Available for freelance projects worldwide. Based in {}.",
        site.country
    )
}

pub fn metadata(site: &SiteConfig) -> SiteMetadata {
    let title = format!("{} - {}", site.owner, site.job_title);
    let description = site_description(site);
    SiteMetadata {
        title: title.clone(),
        title_template: format!("%s | {}", site.owner),
        description: description.clone(),
        keywords: KEYWORDS.to_vec(),
        canonical_url: site.base_url.clone(),
        open_graph: OpenGraph {
            kind: "website",
            url: site.base_url.clone(),
            title,
            description,
            site_name: format!("{} Portfolio", site.brand),
            locale: "en_US",
        },
        structured_data: structured_data(site),
    }
}

/// schema.org `@graph` with the person, site, page, service catalog and breadcrumbs.
pub fn structured_data(site: &SiteConfig) -> Value {
    let base = site.base_url.trim_end_matches('/');
    let id = |frag: &str| format!("{}/#{}", base, frag);

    let offers: Vec<Value> = [
        ("Web Application Development", "Full-stack web applications with modern frameworks"),
        ("Mobile App Development", "iOS and Android mobile applications"),
        ("AI Integration", "Artificial intelligence and machine learning solutions"),
        ("Automation Solutions", "Custom workflow automation and process optimization"),
    ]
    .iter()
    .map(|(name, description)| {
        json!({
            "@type": "Offer",
            "itemOffered": { "@type": "Service", "name": name, "description": description }
        })
    })
    .collect();

    let breadcrumbs: Vec<Value> = std::iter::once(("Home", base.to_string()))
        .chain(
            NAV_ITEMS
                .iter()
                .map(|n| (n.name, format!("{}/#{}", base, n.href))),
        )
        .enumerate()
        .map(|(i, (name, item))| {
            json!({ "@type": "ListItem", "position": i + 1, "name": name, "item": item })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@graph": [
            {
                "@type": "Person",
                "@id": id("person"),
                "name": site.brand,
                "url": base,
                "image": format!("{}/profile-image.jpg", base),
                "email": site.email,
                "jobTitle": site.job_title,
                "worksFor": { "@type": "Organization", "name": "Freelance" },
                "sameAs": site.same_as,
                "knowsAbout": [
                    "Web Development", "Mobile App Development", "React", "Next.js",
                    "Node.js", "TypeScript", "Python", "AI Integration", "Full-Stack Development"
                ],
                "address": { "@type": "PostalAddress", "addressCountry": site.country }
            },
            {
                "@type": "WebSite",
                "@id": id("website"),
                "url": base,
                "name": format!("{} Portfolio", site.brand),
                "description": "Full-stack developer portfolio showcasing web applications, mobile apps, and AI solutions",
                "publisher": { "@id": id("person") },
                "inLanguage": "en-US"
            },
            {
                "@type": "WebPage",
                "@id": id("webpage"),
                "url": base,
                "name": format!("{} - {}", site.brand, site.job_title),
                "isPartOf": { "@id": id("website") },
                "about": { "@id": id("person") },
                "description": site_description(site),
                "inLanguage": "en-US"
            },
            {
                "@type": "ProfessionalService",
                "@id": id("service"),
                "name": format!("{} Development Services", site.brand),
                "description": "Professional web and mobile development services",
                "provider": { "@id": id("person") },
                "areaServed": "Worldwide",
                "hasOfferCatalog": {
                    "@type": "OfferCatalog",
                    "name": "Development Services",
                    "itemListElement": offers
                }
            },
            {
                "@type": "BreadcrumbList",
                "@id": id("breadcrumb"),
                "itemListElement": breadcrumbs
            }
        ]
    })
}

// ============ Chat ============

/// Greeting that seeds every chat transcript.
pub fn chat_greeting(site: &SiteConfig) -> String {
    format!(
        "👋 Hi! I'm {}'s AI assistant. Ask me anything about my services, skills, or projects!",
        site.brand
    )
}

/// Reply used when the LLM answers with nothing.
pub fn llm_empty_reply(site: &SiteConfig) -> String {
    format!(
        "I'm having trouble answering that. Please contact {} directly at {}",
        site.owner, site.email
    )
}

/// Reply sent alongside a 500 from the chat relay.
pub fn chat_apology(site: &SiteConfig) -> String {
    format!(
        "Sorry, I'm having technical difficulties. Please try again or contact {} directly at {}",
        site.owner, site.email
    )
}

/// System prompt handed to the LLM: who the owner is, what they offer, and how to answer.
pub fn system_prompt(site: &SiteConfig) -> String {
    let owner = &site.owner;
    let services = services()
        .iter()
        .filter(|s| s.title != "And More")
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s.title))
        .chain(std::iter::once(
            "7. API Development - RESTful APIs, GraphQL, microservices".to_string(),
        ))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are {owner}'s AI assistant. Here's information about {owner}:

ABOUT:
- {job_title}
- Specializes in building modern web and mobile applications
- Expert in React, Next.js, Node.js, TypeScript, and AI integration

SERVICES OFFERED:
{services}

TECH STACK:
- Frontend: React, Next.js, TypeScript, Tailwind CSS, Framer Motion
- Backend: Node.js, Express, Python, FastAPI
- Mobile: React Native, Flutter
- AI/ML: TensorFlow, PyTorch, OpenAI, Langchain
- Database: PostgreSQL, MongoDB, Firebase, Supabase
- Cloud: AWS, Google Cloud, Vercel, Netlify

CONTACT:
- Email: {email}
- Location: {country}
- Available for: Freelance projects, consulting, full-time opportunities

PERSONALITY:
- Professional yet friendly
- Solution-oriented
- Passionate about clean code and user experience
- Always eager to learn new technologies

When answering questions:
- Be concise and helpful
- Focus on {owner}'s skills and services
- Encourage potential clients to reach out
- If asked about pricing, suggest contacting directly for a quote
- If asked about availability, say {owner} is available for new projects
"#,
        owner = owner,
        job_title = site.job_title,
        services = services,
        email = site.email,
        country = site.country,
    )
}
