//! Batch scheduler for fetch+extract operations
//!
//! This module handles:
//! - Partitioning the link list into fixed-size batches, front to back
//! - Launching one independent task per link within a batch
//! - Waiting for each batch up to a time budget before moving on
//! - Containing per-operation faults so a run always reaches the end
//!
//! Operations still running when their batch budget expires are abandoned,
//! not cancelled. Whatever they produce later is still sent to the results
//! channel; once the run has closed that channel the result is dropped.

use crate::config::EngineConfig;
use crate::crawler::extractor::ProductExtractor;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::product::Product;
use reqwest::Client;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Messages flowing from the scheduler to the run that drains them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMessage {
    /// A link produced a product
    Parsed(Product),

    /// Every batch has been waited for; no on-time result is outstanding
    BatchesDrained,
}

/// The work done for a single link
///
/// Implementations report failures themselves (logging the link and the
/// reason) and return `None`; they never abort the batch.
pub trait ProcessLink: Send + Sync + 'static {
    fn process(&self, link: &str) -> impl Future<Output = Option<Product>> + Send;
}

/// Fetches a page over HTTP and extracts a product from it
#[derive(Debug, Clone)]
pub struct PageProcessor {
    client: Client,
    extractor: ProductExtractor,
}

impl PageProcessor {
    pub fn new(client: Client, extractor: ProductExtractor) -> Self {
        Self { client, extractor }
    }
}

impl ProcessLink for PageProcessor {
    fn process(&self, link: &str) -> impl Future<Output = Option<Product>> + Send {
        async move {
            let body = match fetch_page(&self.client, link).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Failed to load page {} ({}): {}", link, e.kind(), e);
                    return None;
                }
            };

            match self.extractor.extract(&body) {
                Ok(product) => {
                    tracing::debug!("Parsed {} from {}", product, link);
                    Some(product)
                }
                Err(e) => {
                    tracing::error!("Failed to parse page {}: {}", link, e);
                    None
                }
            }
        }
    }
}

/// Outcome of driving all batches of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of links handed to the scheduler
    pub links: usize,

    /// Number of batches formed
    pub batches: usize,

    /// Batches whose wait hit the time budget
    pub timed_out_batches: usize,

    /// Operations that panicked or were cancelled before finishing
    pub faulted_operations: usize,
}

/// Splits links into consecutive batches of at most `batch_size`
///
/// Order is preserved both within and across batches.
pub fn partition_links(links: Vec<String>, batch_size: usize) -> Vec<Vec<String>> {
    let batch_size = batch_size.max(1);
    let mut remaining = VecDeque::from(links);
    let mut batches = Vec::with_capacity(remaining.len().div_ceil(batch_size));

    while !remaining.is_empty() {
        let take = batch_size.min(remaining.len());
        batches.push(remaining.drain(..take).collect());
    }

    batches
}

/// Runs fetch+extract operations in fixed-size concurrent batches
pub struct BatchScheduler<P> {
    processor: Arc<P>,
    batch_size: usize,
    batch_timeout: Duration,
}

impl<P: ProcessLink> BatchScheduler<P> {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - Batch size and per-batch time budget
    /// * `processor` - The per-link operation
    pub fn new(config: &EngineConfig, processor: P) -> Self {
        Self {
            processor: Arc::new(processor),
            batch_size: config.batch_size,
            batch_timeout: config.batch_timeout(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_timeout(&self) -> Duration {
        self.batch_timeout
    }

    /// Drives every batch to completion or timeout
    ///
    /// Batch N+1 is launched only after the wait for batch N has returned.
    /// Successful products are sent on `results` as they complete.
    pub async fn run(&self, links: Vec<String>, results: &UnboundedSender<RunMessage>) -> BatchReport {
        let mut report = BatchReport {
            links: links.len(),
            ..BatchReport::default()
        };

        for (index, batch) in partition_links(links, self.batch_size)
            .into_iter()
            .enumerate()
        {
            report.batches += 1;
            tracing::debug!("Launching batch {} with {} links", index + 1, batch.len());

            let handles: Vec<(String, JoinHandle<()>)> = batch
                .into_iter()
                .map(|link| {
                    let handle = self.spawn_operation(link.clone(), results.clone());
                    (link, handle)
                })
                .collect();

            let mut faulted = 0;
            let waited =
                tokio::time::timeout(self.batch_timeout, wait_for_batch(handles, &mut faulted))
                    .await;
            report.faulted_operations += faulted;

            if waited.is_err() {
                report.timed_out_batches += 1;
                tracing::info!(
                    "Batch {} wait timeout ({:?}), moving on with operations still in flight",
                    index + 1,
                    self.batch_timeout
                );
            }
        }

        tracing::debug!(
            "All batches drained: {} batches, {} timed out, {} faulted operations",
            report.batches,
            report.timed_out_batches,
            report.faulted_operations
        );

        report
    }

    /// Spawns the fetch+extract task for one link
    fn spawn_operation(&self, link: String, results: UnboundedSender<RunMessage>) -> JoinHandle<()> {
        let processor = Arc::clone(&self.processor);

        tokio::spawn(async move {
            if let Some(product) = processor.process(&link).await {
                if results.send(RunMessage::Parsed(product)).is_err() {
                    tracing::debug!("Run already finished, dropping late result for {}", link);
                }
            }
        })
    }
}

/// Awaits every operation of a batch, logging the ones that faulted
///
/// Dropping this future (on timeout) detaches the remaining tasks; they keep
/// running.
async fn wait_for_batch(handles: Vec<(String, JoinHandle<()>)>, faulted: &mut usize) {
    for (link, handle) in handles {
        if let Err(e) = handle.await {
            *faulted += 1;
            let fault = if e.is_panic() { "panic" } else { "cancellation" };
            tracing::error!("Unhandled {} while parsing {}: {}", fault, link, e);
        }
    }
}
