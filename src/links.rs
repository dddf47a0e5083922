//! Link sources
//!
//! A link source supplies the ordered list of page addresses for one run.
//! The engine never deduplicates or persists links; it consumes whatever the
//! source returns, front to back.

use crate::ParserError;
use std::path::{Path, PathBuf};

/// Supplies the page addresses for a run
pub trait LinkSource {
    /// Loads the full, ordered list of links
    ///
    /// An error means the source could not be read at all. The run controller
    /// logs it and treats the run as having no links.
    fn load_links(&self) -> Result<Vec<String>, ParserError>;
}

/// Reads links from a text file, one address per line
#[derive(Debug, Clone)]
pub struct FileLinkSource {
    path: PathBuf,
}

impl FileLinkSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LinkSource for FileLinkSource {
    fn load_links(&self) -> Result<Vec<String>, ParserError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| ParserError::LinkSource {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(parse_link_lines(&content))
    }
}

impl LinkSource for Vec<String> {
    fn load_links(&self) -> Result<Vec<String>, ParserError> {
        Ok(self.clone())
    }
}

/// Splits link file content into addresses
///
/// Surrounding whitespace (including `\r` from CRLF files) is stripped and
/// blank lines are skipped. Order and duplicates are preserved.
pub fn parse_link_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
