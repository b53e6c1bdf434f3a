//! Application state for the loan decision API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::calculation::DecisionEngine;

/// Shared application state.
///
/// Holds the decision engine and the session reference rate used when a
/// request does not supply its own.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<DecisionEngine>,
    base_rate: Decimal,
    workers: usize,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: DecisionEngine, base_rate: Decimal) -> Self {
        Self {
            engine: Arc::new(engine),
            base_rate,
            workers: 1,
        }
    }

    /// Sets the number of worker threads used for batch requests.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Returns the decision engine.
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Returns a shared handle to the engine.
    pub fn engine_handle(&self) -> Arc<DecisionEngine> {
        Arc::clone(&self.engine)
    }

    /// The reference rate used when a request omits one.
    pub fn base_rate(&self) -> Decimal {
        self.base_rate
    }

    /// Worker threads for batch requests.
    pub fn workers(&self) -> usize {
        self.workers
    }
}
