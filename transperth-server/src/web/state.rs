//! Application state for the web layer.

use std::sync::Arc;

use crate::coordinator::Coordinator;
use crate::transperth::AnySource;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Routes, their snapshots, and the planner behind them
    pub coordinator: Arc<Coordinator<AnySource>>,
}

impl AppState {
    /// Create a new app state around a coordinator that may already be
    /// running in the background.
    pub fn new(coordinator: Arc<Coordinator<AnySource>>) -> Self {
        Self { coordinator }
    }
}
