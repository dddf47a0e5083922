//! Run events and listener registration
//!
//! Listeners are normally called from the engine's background task, so
//! implementations must be `Send + Sync` and should return quickly. When a
//! run has no links, the finished event is emitted synchronously on the
//! thread that called `start`, before it returns.

use crate::crawler::product::Product;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Observer of a parsing run
///
/// Both callbacks default to doing nothing.
pub trait ParseListener: Send + Sync {
    /// Called once per successfully extracted product, in completion order
    fn on_product_parsed(&self, _product: &Product) {}

    /// Called exactly once per run, after every batch has been drained
    fn on_parsing_finished(&self) {}
}

/// A listener that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ParseListener for NoopListener {}

/// Event forwarded by a [`ChannelListener`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    ProductParsed(Product),
    ParsingFinished,
}

/// Forwards run events into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: UnboundedSender<ParseEvent>,
}

impl ChannelListener {
    /// Creates the listener together with the receiving end of its channel
    pub fn new() -> (Self, UnboundedReceiver<ParseEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: ParseEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event receiver dropped, discarding event");
        }
    }
}

impl ParseListener for ChannelListener {
    fn on_product_parsed(&self, product: &Product) {
        self.forward(ParseEvent::ProductParsed(product.clone()));
    }

    fn on_parsing_finished(&self) {
        self.forward(ParseEvent::ParsingFinished);
    }
}

/// Registered listeners, shared between the controller and its run tasks
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    inner: Arc<Mutex<Vec<Arc<dyn ParseListener>>>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Arc<dyn ParseListener>) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Copies the current list so callbacks run without holding the lock
    fn snapshot(&self) -> Vec<Arc<dyn ParseListener>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn product_parsed(&self, product: &Product) {
        for listener in self.snapshot() {
            listener.on_product_parsed(product);
        }
    }

    pub(crate) fn parsing_finished(&self) {
        for listener in self.snapshot() {
            listener.on_parsing_finished();
        }
    }
}
