//! # Mystery Scout
//!
//! Explore mystery-fiction subgenres with a generative text model: list
//! notable authors of a subgenre, or read a short essay about it.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (SearchRequest, Author, SearchResult, etc.)
//! - [`catalog`]: The subgenre catalog offered to users
//! - [`prompts`]: Prompt construction per search kind
//! - [`completion`]: Completion backends (Gemini, scripted mock) and the retrying client
//! - [`sanitize`]: Turning raw completions into typed payloads
//! - [`search`]: Search orchestration shared by the server and the CLI
//! - [`server`]: axum HTTP server
//! - [`client`]: Request controller, view contract and search transports
//! - [`render`]: Result cards and their HTML rendering
//! - [`ui`]: Terminal output
//! - [`utils`]: HTTP client and retry policy
//! - [`config`]: Configuration management

pub mod catalog;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod render;
pub mod sanitize;
pub mod search;
pub mod server;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use error::SearchError;
pub use models::{Author, SearchKind, SearchRequest, SearchResult, Subgenre};
pub use search::SearchService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
