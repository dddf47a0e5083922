//! Run controller - start/finish lifecycle of a parsing run
//!
//! The controller owns the run state (active flag + success counter) and is
//! the only place that mutates it:
//! - `start` flips the flag on, resets the counter and dispatches the batch
//!   phase onto the tokio runtime, returning immediately
//! - the run task drains extraction results, counting and forwarding each one
//! - finishing logs the count, clears the flag and emits the finished event
//!
//! Only one run can be in flight per controller. A second `start` while busy
//! is rejected with a warning and has no other effect.

use crate::config::{Config, EngineConfig};
use crate::crawler::events::{Listeners, ParseListener};
use crate::crawler::extractor::ProductExtractor;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::scheduler::{BatchScheduler, PageProcessor, ProcessLink, RunMessage};
use crate::links::LinkSource;
use crate::ParserError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Result of a call to [`RunController::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The batch phase was dispatched for this many links
    Started { links: usize },

    /// There was nothing to do; the finished event has already fired
    Empty,

    /// A run is already in progress; nothing changed
    Rejected,
}

/// Per-controller run state
#[derive(Debug, Default)]
struct RunState {
    active: bool,
    successes: u64,
}

impl RunState {
    /// Marks a run active, unless one already is
    fn try_begin(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.successes = 0;
        true
    }

    fn record_success(&mut self) -> u64 {
        self.successes += 1;
        self.successes
    }

    /// Clears the active flag and returns the final count
    fn finish(&mut self) -> u64 {
        self.active = false;
        self.successes
    }
}

fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives parsing runs and reports their progress to listeners
pub struct RunController<P = PageProcessor> {
    state: Arc<Mutex<RunState>>,
    listeners: Listeners,
    scheduler: Arc<BatchScheduler<P>>,
    runtime: Handle,
}

impl RunController<PageProcessor> {
    /// Creates a controller that fetches pages over HTTP
    ///
    /// Must be called from within a tokio runtime; runs are spawned onto it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use product_parser::config::Config;
    /// use product_parser::crawler::{ChannelListener, ParseEvent, RunController};
    /// use product_parser::links::FileLinkSource;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), product_parser::ParserError> {
    /// let controller = RunController::new(&Config::default())?;
    /// let (listener, mut events) = ChannelListener::new();
    /// controller.subscribe(Arc::new(listener));
    ///
    /// controller.start(&FileLinkSource::new("links.txt"));
    /// while let Some(event) = events.recv().await {
    ///     match event {
    ///         ParseEvent::ProductParsed(product) => println!("{}", product),
    ///         ParseEvent::ParsingFinished => break,
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &Config) -> Result<Self, ParserError> {
        let client = build_http_client(&config.http)?;
        let extractor = ProductExtractor::new(&config.extractor)?;
        Self::with_processor(&config.engine, PageProcessor::new(client, extractor))
    }
}

impl<P: ProcessLink> RunController<P> {
    /// Creates a controller around a custom per-link operation
    pub fn with_processor(engine: &EngineConfig, processor: P) -> Result<Self, ParserError> {
        Ok(Self {
            state: Arc::new(Mutex::new(RunState::default())),
            listeners: Listeners::default(),
            scheduler: Arc::new(BatchScheduler::new(engine, processor)),
            runtime: Handle::try_current()?,
        })
    }

    /// Registers a listener for all subsequent events
    pub fn subscribe(&self, listener: Arc<dyn ParseListener>) {
        self.listeners.add(listener);
    }

    /// Returns true while a run is in progress
    pub fn is_running(&self) -> bool {
        lock(&self.state).active
    }

    /// Successful extractions of the current run, or of the last finished one
    pub fn success_count(&self) -> u64 {
        lock(&self.state).successes
    }

    /// Starts a run over the links supplied by `source`
    ///
    /// Returns without waiting for any page. Completion is signalled through
    /// `on_parsing_finished` on every registered listener.
    pub fn start(&self, source: &dyn LinkSource) -> StartOutcome {
        if !lock(&self.state).try_begin() {
            tracing::warn!("Attempt to start a new parsing run while the previous one is still in progress");
            return StartOutcome::Rejected;
        }

        let links = match source.load_links() {
            Ok(links) => links,
            Err(e) => {
                tracing::error!("{}", e);
                Vec::new()
            }
        };

        if links.is_empty() {
            finish_run(&self.state, &self.listeners);
            return StartOutcome::Empty;
        }

        let link_count = links.len();
        tracing::info!("{} tasks will be launched", link_count);

        let state = Arc::clone(&self.state);
        let listeners = self.listeners.clone();
        let scheduler = Arc::clone(&self.scheduler);

        self.runtime.spawn(async move {
            let run = tokio::spawn(run_batches(
                scheduler,
                links,
                Arc::clone(&state),
                listeners.clone(),
            ));

            if let Err(e) = run.await {
                tracing::error!("Parsing run aborted unexpectedly: {}", e);
            }

            finish_run(&state, &listeners);
        });

        StartOutcome::Started { links: link_count }
    }
}

/// Drives the batches while draining their results
async fn run_batches<P: ProcessLink>(
    scheduler: Arc<BatchScheduler<P>>,
    links: Vec<String>,
    state: Arc<Mutex<RunState>>,
    listeners: Listeners,
) {
    let (tx, rx) = mpsc::unbounded_channel();

    let drive = async {
        let report = scheduler.run(links, &tx).await;
        let _ = tx.send(RunMessage::BatchesDrained);
        report
    };

    let (report, ()) = tokio::join!(drive, drain_results(rx, &state, &listeners));

    if report.timed_out_batches > 0 || report.faulted_operations > 0 {
        tracing::warn!(
            "{} of {} batches timed out, {} operations faulted",
            report.timed_out_batches,
            report.batches,
            report.faulted_operations
        );
    }
}

/// Counts and forwards products until the batch phase reports completion
///
/// The receiver is dropped on return, so results from abandoned operations
/// that complete afterwards are discarded by the sender.
async fn drain_results(
    mut rx: UnboundedReceiver<RunMessage>,
    state: &Mutex<RunState>,
    listeners: &Listeners,
) {
    while let Some(RunMessage::Parsed(product)) = rx.recv().await {
        let count = lock(state).record_success();
        tracing::debug!("Product {} parsed ({} so far)", product.id(), count);
        listeners.product_parsed(&product);
    }
}

/// Closes the run and emits the finished event
fn finish_run(state: &Mutex<RunState>, listeners: &Listeners) {
    let count = lock(state).finish();
    tracing::info!(
        "{} {} finished successfully",
        count,
        if count == 1 { "task" } else { "tasks" }
    );
    listeners.parsing_finished();
}
