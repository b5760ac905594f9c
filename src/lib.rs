//! Contact-Harvest: contact email discovery for a set of websites
//!
//! This crate expands search queries into candidate site origins, crawls each
//! site one hop deep along contact-likely links, and extracts the email
//! addresses it finds. Work can run in-process or be fanned out in batches to
//! remote scrape/search actions that tolerate partial failure.

pub mod config;
pub mod crawler;
pub mod dispatch;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use std::fmt;
use thiserror::Error;

/// Main error type for Contact-Harvest operations
///
/// Only fatal conditions end up here. Failures of a single batch, seed or
/// query are contained where they happen and surface as counters instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid origin pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Classification of a contained unit failure
///
/// Every network-facing unit (one batch, one page, one query) fails in one of
/// these two ways. Finding nothing is not a failure and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection error, timeout, or unreadable body
    Transport,
    /// The remote side answered with a non-success status or an unusable payload
    Upstream,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Upstream => write!(f, "upstream"),
        }
    }
}

/// Result type alias for Contact-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlWorker, LinkFilter};
pub use dispatch::{partition, BatchDispatcher, DispatchOutcome};
pub use extract::extract_emails;
pub use pipeline::{Pipeline, PipelineReport};
pub use search::SearchExpander;
pub use state::CrawlPhase;
pub use url::{normalize_target, origin_of};
