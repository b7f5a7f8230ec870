//! # Portfolio Site
//!
//! Backend for a single-page developer portfolio: a content layer over a
//! headless CMS, a contact-form email relay, and a two-tier chat relay that
//! answers with a managed intent classifier and falls back to a hosted LLM.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │  Sanity CMS │──▶│   content   │──▶│  page model  │
//! │   (GROQ)    │   │  + icons    │   │  + metadata  │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │
//!   contact form ──▶ contact ──▶ SMTP        │
//!   chat widget  ──▶ chat ──▶ Dialogflow     ▼
//!                        └──▶ Groq LLM   ┌──────────┐
//!                                        │   HTTP   │
//!                                        │  (axum)  │
//!                                        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! folio check-config               # validate config + environment
//! folio content projects           # fetch featured projects from the CMS
//! folio chat "what do you build?"  # run one message through the chat relay
//! folio serve                      # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration plus environment secrets |
//! | [`models`] | CMS records and relay request/response bodies |
//! | [`content`] | GROQ queries, Sanity client, in-memory store, image URLs |
//! | [`icons`] | Skill icon registry |
//! | [`mailer`] | Contact email composition and SMTP delivery |
//! | [`contact`] | Contact relay |
//! | [`intent`] | Dialogflow intent detection |
//! | [`llm`] | Groq chat completions |
//! | [`chat`] | Chat relay with LLM fallback |
//! | [`site`] | Static site content, SEO metadata, JSON-LD |
//! | [`page`] | Page model assembly |
//! | [`view_state`] | Carousel, modal, transcript and form state machines |
//! | [`server`] | HTTP server |
//! | [`logging`] | tracing subscriber setup |
//! | [`error`] | Relay error type |

pub mod chat;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod icons;
pub mod intent;
pub mod llm;
pub mod logging;
pub mod mailer;
pub mod models;
pub mod page;
pub mod server;
pub mod site;
pub mod view_state;
