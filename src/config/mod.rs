//! Configuration module for Product-Parser
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All sections are optional, so an empty file (or no file at all, via
//! `Config::default()`) yields the stock settings: batches of 10 links with a
//! 20 second budget each.
//!
//! # Example
//!
//! ```no_run
//! use product_parser::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("parser.toml")).unwrap();
//! println!("Batch timeout: {:?}", config.engine.batch_timeout());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ElementTarget, EngineConfig, ExtractorConfig, HttpConfig, IdentifierTarget,
    OutputConfig, SinkKind,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
