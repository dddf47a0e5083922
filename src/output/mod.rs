//! Output module for persisting and presenting parsed products
//!
//! This module handles:
//! - Appending records to a CSV file
//! - Inserting rows into a SQLite database
//! - Printing records to the terminal
//! - Adapting any of these sinks into a run listener

mod csv_file;
mod schema;
mod sqlite_sink;
mod traits;

pub use csv_file::CsvFileSink;
pub use sqlite_sink::SqliteSink;
pub use traits::{OutputError, OutputResult, ProductSink};

use crate::config::{OutputConfig, SinkKind};
use crate::crawler::{ParseListener, Product};
use std::io::{Stdout, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Prints each record line to stdout (or any other writer)
///
/// Writes after `close` are dropped.
pub struct DisplaySink<W = Stdout> {
    out: Mutex<W>,
    closed: AtomicBool,
}

impl<W: Write + Send> DisplaySink<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            closed: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DisplaySink {
    fn default() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl<W: Write + Send> ProductSink for DisplaySink<W> {
    fn write_product(&self, product: &Product) -> OutputResult<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        if self.closed.load(Ordering::Acquire) {
            tracing::warn!("Display already closed, dropping product {}", product.id());
            return Ok(());
        }

        writeln!(out, "{}", product)?;
        Ok(())
    }

    fn close(&self) -> OutputResult<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        self.closed.store(true, Ordering::Release);
        out.flush()?;
        Ok(())
    }
}

/// Opens the sink selected by the output configuration
pub fn open_sink(config: &OutputConfig) -> OutputResult<Box<dyn ProductSink>> {
    let sink: Box<dyn ProductSink> = match config.sink {
        SinkKind::File => Box::new(CsvFileSink::open(Path::new(&config.path))?),
        SinkKind::Database => Box::new(SqliteSink::open(Path::new(&config.path))?),
        SinkKind::Display => Box::new(DisplaySink::with_writer(std::io::stdout())),
    };

    tracing::debug!("Opened {:?} output sink", config.sink);
    Ok(sink)
}

/// Writes every parsed product to a sink and closes it when the run finishes
///
/// Sink failures are logged and never reach the engine.
pub struct SinkListener<S: ?Sized> {
    sink: Box<S>,
}

impl<S: ProductSink + ?Sized> SinkListener<S> {
    pub fn new(sink: Box<S>) -> Self {
        Self { sink }
    }
}

impl<S: ProductSink + ?Sized> ParseListener for SinkListener<S> {
    fn on_product_parsed(&self, product: &Product) {
        if let Err(e) = self.sink.write_product(product) {
            tracing::error!("Failed to write product {}: {}", product.id(), e);
        }
    }

    fn on_parsing_finished(&self) {
        if let Err(e) = self.sink.close() {
            tracing::error!("Failed to close output: {}", e);
        }
    }
}
