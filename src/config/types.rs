use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Product-Parser
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub http: HttpConfig,
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
}

/// Batch engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of links fetched concurrently in one batch
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Time budget for one batch (seconds)
    #[serde(rename = "batch-timeout-secs")]
    pub batch_timeout_secs: u64,

    /// Time budget for one batch in milliseconds, overrides `batch-timeout-secs`
    #[serde(rename = "batch-timeout-ms")]
    pub batch_timeout_ms: Option<u64>,
}

impl EngineConfig {
    /// Returns the effective time budget for one batch
    pub fn batch_timeout(&self) -> Duration {
        match self.batch_timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_secs(self.batch_timeout_secs),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_timeout_secs: 20,
            batch_timeout_ms: None,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("product-parser/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// A structural lookup target: an element kind plus an exact class value
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElementTarget {
    /// Element name, e.g. `div`
    pub element: String,

    /// Exact value of the `class` attribute
    pub class: String,
}

impl ElementTarget {
    pub fn new(element: &str, class: &str) -> Self {
        Self {
            element: element.to_string(),
            class: class.to_string(),
        }
    }
}

/// Identifier target: a container plus the inline element holding the digits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentifierTarget {
    #[serde(flatten)]
    pub container: ElementTarget,

    /// First descendant of this kind inside the container carries the identifier
    #[serde(rename = "inner-element")]
    pub inner_element: String,
}

/// Extraction targets for the three product fields
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub identifier: IdentifierTarget,
    pub name: ElementTarget,
    pub price: ElementTarget,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            identifier: IdentifierTarget {
                container: ElementTarget::new("div", "shouhinmei"),
                inner_element: "span".to_string(),
            },
            name: ElementTarget::new("h1", "shouhin_name"),
            price: ElementTarget::new("span", "price"),
        }
    }
}

/// Where parsed products are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Append CSV records to a file
    #[default]
    File,
    /// Insert rows into a SQLite database
    Database,
    /// Print records to stdout
    Display,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Selected sink
    pub sink: SinkKind,

    /// Output file (CSV file or SQLite database)
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::File,
            path: "products.csv".to_string(),
        }
    }
}
