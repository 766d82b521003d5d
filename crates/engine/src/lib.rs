//! # Engine
//!
//! Client-side orchestration of one analysis session: the upload → stock
//! analysis → variable discovery pipeline, the variable selection, and the
//! debounced refresh of the correlation matrix and time series.
//!
//! All state lives behind a [`Workspace`]. The presentation layer mutates it
//! only through the entry points below and observes it through
//! [`WorkspaceView`] snapshots.

use api_client::AnalysisGateway;
use configuration::RefreshConfig;
use core_types::{AnalysisInput, VariableCatalog};
use std::sync::Arc;
use tokio::sync::watch;

pub mod error;
pub mod pipeline;
mod refresh;
mod state;

pub use error::WorkflowError;
pub use pipeline::PipelineOutcome;
pub use state::WorkspaceView;

use crate::state::{Inner, Shared};

/// The single active analysis session of a client.
///
/// Selection entry points spawn the debounce timer with `tokio::spawn`, so a
/// workspace must be driven from within a Tokio runtime.
pub struct Workspace {
    shared: Arc<Shared>,
}

impl Workspace {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, refresh: RefreshConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(gateway, refresh)),
        }
    }

    /// Runs the full pipeline for a snapshot of `input`.
    ///
    /// Failures never escape as errors: they are written to the status slot and
    /// reported in the returned outcome. Starting a run supersedes any run or
    /// refresh still in flight.
    pub async fn start_pipeline(&self, input: AnalysisInput) -> PipelineOutcome {
        pipeline::run(&self.shared, input).await
    }

    /// Flips one variable in or out of the selection.
    ///
    /// Returns `false` and changes nothing if the current catalog has no such
    /// variable.
    pub fn toggle_variable(&self, name: &str) -> bool {
        self.shared.update(|inner| match inner.catalog.with_toggled(name) {
            Some(next) => {
                self.apply_selection(inner, next);
                true
            }
            None => {
                tracing::warn!(variable = name, "Ignoring toggle of a variable outside the catalog.");
                false
            }
        })
    }

    pub fn select_all(&self) {
        self.shared.update(|inner| {
            let next = inner.catalog.with_all_selected();
            self.apply_selection(inner, next);
        });
    }

    pub fn clear_selection(&self) {
        self.shared.update(|inner| {
            let next = inner.catalog.with_cleared();
            self.apply_selection(inner, next);
        });
    }

    /// Clears the error message without touching anything else.
    pub fn dismiss_error(&self) {
        self.shared.update(|inner| inner.status.error = None);
    }

    /// The latest published snapshot.
    pub fn view(&self) -> WorkspaceView {
        self.shared.view()
    }

    /// A receiver notified after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkspaceView> {
        self.shared.subscribe()
    }

    /// Waits until no pipeline run and no visualization refresh is outstanding.
    pub async fn settled(&self) -> WorkspaceView {
        let mut rx = self.subscribe();
        // The sender lives in `self.shared`, so the channel cannot close while we wait.
        match rx.wait_for(WorkspaceView::is_settled).await {
            Ok(view) => view.clone(),
            Err(_) => self.view(),
        }
    }

    fn apply_selection(&self, inner: &mut Inner, next: VariableCatalog) {
        if next.selected() == inner.catalog.selected() {
            return;
        }
        tracing::debug!(selected = ?next.selected(), "Selection changed.");
        inner.catalog = next;
        refresh::on_change(&self.shared, inner);
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.shared.update(Inner::cancel_debounce);
    }
}
