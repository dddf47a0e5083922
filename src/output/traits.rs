//! Output sink trait and error types

use crate::crawler::Product;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Bad output path: {0:?}")]
    BadPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for parsed products
///
/// Products arrive from concurrent extraction tasks, so implementations
/// serialize their own writes.
pub trait ProductSink: Send + Sync {
    /// Writes a single product record
    fn write_product(&self, product: &Product) -> OutputResult<()>;

    /// Flushes and releases the destination
    ///
    /// Writes after `close` are dropped.
    fn close(&self) -> OutputResult<()>;
}
