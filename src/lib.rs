//! # Gist
//!
//! Layered summaries of articles, YouTube videos, PDFs and pasted text,
//! with a counter-argument and a steelman for every piece.
//!
//! ## Features
//!
//! - **Layered Detail**: four self-contained summaries, from one sentence to full detail
//! - **Framework-Aware Structure**: story arc or argument map, chosen per document
//! - **Critical Thinking**: the strongest case against the thesis, and a stronger case for it
//! - **Provider Agnostic**: OpenAI-compatible endpoints, or Gemini via rstructor

pub mod agent;
pub mod config;
pub mod content;
pub mod error;
pub mod extractor;
pub mod prompts;
pub mod reasoning;
pub mod scraper;
pub mod server;
pub mod summary;
pub mod ui;
pub mod youtube;

pub use agent::Summarizer;
pub use config::Config;
pub use content::{ContentType, ExtractedContent, GistRequest};
pub use error::{ErrorKind, GistError};
pub use extractor::ContentExtractor;
pub use reasoning::{LazyReasoning, ReasoningService};
pub use summary::{Framework, GistResult, Structure};
