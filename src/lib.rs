//! Product-Parser: a batched product page scraper
//!
//! This crate reads a list of product page addresses, fetches them in
//! fixed-size concurrent batches and extracts an identifier, a name and a
//! price from each page. Every successful extraction is reported to the
//! registered listeners as it happens, and each run ends with exactly one
//! completion signal.

pub mod config;
pub mod crawler;
pub mod links;
pub mod output;

use thiserror::Error;

/// Main error type for Product-Parser operations
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Failed to read links from {path}: {source}")]
    LinkSource {
        path: String,
        source: std::io::Error,
    },

    #[error("No tokio runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

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
}

/// Result type alias for Product-Parser operations
pub type Result<T> = std::result::Result<T, ParserError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{ParseEvent, ParseListener, Product, RunController, StartOutcome};
pub use links::{FileLinkSource, LinkSource};
