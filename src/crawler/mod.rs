//! Crawler module for product page fetching and extraction
//!
//! This module contains the extraction engine, including:
//! - HTTP fetching with address validation
//! - Product extraction from page markup
//! - Batch scheduling with a per-batch time budget
//! - Run lifecycle and event fan-out

mod controller;
mod events;
mod extractor;
mod fetcher;
mod product;
mod scheduler;

pub use controller::{RunController, StartOutcome};
pub use events::{ChannelListener, NoopListener, ParseEvent, ParseListener};
pub use extractor::{find_first_element, ExtractionError, ProductExtractor};
pub use fetcher::{build_http_client, fetch_page, validate_link, FetchError};
pub use product::{Product, CSV_HEADER};
pub use scheduler::{
    partition_links, BatchReport, BatchScheduler, PageProcessor, ProcessLink, RunMessage,
};
