//! # Portfolio CLI (`folio`)
//!
//! Runs the portfolio backend and exercises its pieces from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! folio --config ./config/folio.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `folio serve` | Start the HTTP server |
//! | `folio content <kind>` | Fetch and print one content list (or one project) |
//! | `folio chat "<message>"` | Send one message through the chat relay |
//! | `folio check-config` | Validate configuration and report which backends are set |
//! | `folio schema` | Print the site's JSON-LD structured data |
//!
//! The config file is optional; without it every setting takes its default
//! and secrets come from the environment (or a `.env` file).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use portfolio_site::chat::ChatRelay;
use portfolio_site::config::{self, Config};
use portfolio_site::content::{ContentStore, MemoryStore, SanityClient};
use portfolio_site::models::ChatRequest;
use portfolio_site::{icons, logging, server, site};

/// Portfolio site backend: CMS content, contact relay, and chat relay.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/folio.toml`. A missing file is not an error.
    #[arg(long, global = true, default_value = "./config/folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve {
        /// Serve content from a JSON fixture instead of the CMS.
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Fetch one content list and print it as JSON.
    Content {
        kind: ContentKind,

        /// With `projects`, fetch the single project with this slug.
        #[arg(long)]
        slug: Option<String>,

        /// Read from a JSON fixture instead of the CMS.
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Send one message through the chat relay and print the reply.
    Chat {
        message: String,

        /// Session ID. A fresh one is generated when omitted.
        #[arg(long)]
        session: Option<String>,
    },

    /// Validate the configuration and report which backends are configured.
    CheckConfig,

    /// Print the JSON-LD structured data embedded in the page head.
    Schema,
}

#[derive(Clone, Copy, ValueEnum)]
enum ContentKind {
    Projects,
    Skills,
    TechStack,
    Testimonials,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = config::load_or_default(&cli.config)?;
    logging::init_logging(&cfg.logging);
    if !cli.config.exists() {
        tracing::info!(
            path = %cli.config.display(),
            "config file not found, using defaults and environment"
        );
    }

    match cli.command {
        Commands::Serve { fixture } => {
            server::run_server(&cfg, fixture.as_deref()).await?;
        }
        Commands::Content {
            kind,
            slug,
            fixture,
        } => {
            let store: Box<dyn ContentStore> = match fixture {
                Some(path) => Box::new(MemoryStore::from_json_file(&path)?),
                None => Box::new(SanityClient::new(&cfg.content)?),
            };
            print_content(store.as_ref(), kind, slug.as_deref()).await?;
        }
        Commands::Chat { message, session } => {
            let relay = ChatRelay::from_config(&cfg)?;
            let session_id = session.unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));
            let reply = relay
                .respond(ChatRequest {
                    message: Some(message),
                    session_id: Some(session_id),
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Commands::CheckConfig => {
            check_config(&cfg);
        }
        Commands::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&site::structured_data(&cfg.site))?
            );
        }
    }

    Ok(())
}

async fn print_content(
    store: &dyn ContentStore,
    kind: ContentKind,
    slug: Option<&str>,
) -> anyhow::Result<()> {
    let json = match (kind, slug) {
        (ContentKind::Projects, Some(slug)) => match store.project_by_slug(slug).await? {
            Some(project) => serde_json::to_string_pretty(&project)?,
            None => anyhow::bail!("No project with slug '{}'", slug),
        },
        (_, Some(_)) => anyhow::bail!("--slug only applies to projects"),
        (ContentKind::Projects, None) => serde_json::to_string_pretty(&store.projects().await?)?,
        (ContentKind::Skills, None) => {
            let skills = store.skills().await?;
            for skill in &skills {
                if icons::lookup(&skill.icon).is_none() {
                    eprintln!(
                        "warning: skill '{}' uses unknown icon '{}', showing {}",
                        skill.title,
                        skill.icon,
                        icons::FALLBACK.name()
                    );
                }
            }
            serde_json::to_string_pretty(&skills)?
        }
        (ContentKind::TechStack, None) => serde_json::to_string_pretty(&store.tech_stack().await?)?,
        (ContentKind::Testimonials, None) => {
            serde_json::to_string_pretty(&store.testimonials().await?)?
        }
    };
    println!("{}", json);
    Ok(())
}

fn check_config(cfg: &Config) {
    let status = |set: bool| if set { "configured" } else { "missing" };

    println!("Configuration OK");
    println!("  bind:       {}", cfg.server.bind);
    println!(
        "  content:    {} (dataset {})",
        status(cfg.content.project_id.is_some() || cfg.content.endpoint.is_some()),
        cfg.content.dataset
    );
    println!(
        "  smtp:       {}",
        status(cfg.smtp.host.is_some() && cfg.smtp.user.is_some())
    );
    println!(
        "  recipient:  {}",
        cfg.contact_recipient().unwrap_or("missing")
    );
    println!(
        "  dialogflow: {} (token {})",
        status(cfg.intent.project_id.is_some()),
        status(cfg.intent.access_token.is_some())
    );
    println!(
        "  llm:        {} (model {})",
        status(cfg.llm.api_key.is_some()),
        cfg.llm.model
    );
    println!("  threshold:  {}", cfg.chat.confidence_threshold);
}
