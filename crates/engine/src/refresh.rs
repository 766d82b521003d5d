//! The visualization refresh loop.
//!
//! Every selection or session change bumps the workspace generation. A change
//! that leaves at least `min_variables` selected schedules a debounced refresh
//! tagged with that generation; a further change aborts the pending timer and
//! schedules a new one. Once the timer fires the task detaches itself from the
//! debounce slot and fetches both charts concurrently. Each response is applied
//! only if its tag is still current when it arrives, so a late response for a
//! replaced session or an older selection is dropped.

use crate::error::WorkflowError;
use crate::state::{Inner, Shared};
use api_client::VisualizationRequest;
use core_types::{ChartType, DataSource, RefreshPhase, SessionId, Visualization};
use std::sync::Arc;

/// The state a refresh was scheduled under.
#[derive(Debug, Clone)]
struct RefreshTicket {
    generation: u64,
    session_id: SessionId,
    variables: Vec<String>,
}

impl Inner {
    fn is_current(&self, ticket: &RefreshTicket) -> bool {
        self.generation == ticket.generation
            && self
                .session
                .as_ref()
                .is_some_and(|s| s.session_id == ticket.session_id)
    }
}

/// Reacts to a change of the `(session, selection)` pair.
///
/// Must be called from inside [`Shared::update`] right after the change was
/// applied, and from within a Tokio runtime.
pub(crate) fn on_change(shared: &Arc<Shared>, inner: &mut Inner) {
    inner.generation += 1;
    inner.cancel_debounce();

    let selected = inner.catalog.selected().len();
    if selected < shared.refresh.min_variables {
        if inner.matrix.is_some() || inner.time_series.is_some() {
            tracing::debug!(selected, "Selection below threshold, clearing charts.");
        }
        inner.clear_visualizations();
        inner.phase = RefreshPhase::Idle;
        return;
    }

    let Some(session) = inner.session.as_ref() else {
        inner.phase = RefreshPhase::Idle;
        return;
    };

    let ticket = RefreshTicket {
        generation: inner.generation,
        session_id: session.session_id.clone(),
        variables: inner.catalog.selected().to_vec(),
    };
    tracing::debug!(
        generation = ticket.generation,
        session = %ticket.session_id,
        variables = ticket.variables.len(),
        "Scheduling visualization refresh."
    );
    inner.phase = RefreshPhase::Debouncing;
    inner.debounce = Some(tokio::spawn(run(Arc::clone(shared), ticket)));
}

async fn run(shared: Arc<Shared>, ticket: RefreshTicket) {
    tokio::time::sleep(shared.refresh.debounce()).await;

    let proceed = shared.update(|inner| {
        if !inner.is_current(&ticket) {
            return false;
        }
        // From here on the fetch runs to completion; later changes only make
        // its results stale instead of aborting it.
        inner.debounce = None;
        inner.phase = RefreshPhase::Fetching;
        inner.status.error = None;
        true
    });
    if !proceed {
        return;
    }

    tracing::info!(
        session = %ticket.session_id,
        variables = ?ticket.variables,
        "Refreshing visualizations."
    );
    futures::join!(
        fetch(&shared, &ticket, ChartType::CorrelationMatrix),
        fetch(&shared, &ticket, ChartType::TimeSeries),
    );

    shared.update(|inner| {
        if inner.is_current(&ticket) {
            inner.phase = RefreshPhase::Idle;
        }
    });
}

async fn fetch(shared: &Shared, ticket: &RefreshTicket, chart_type: ChartType) {
    let request = VisualizationRequest {
        chart_type,
        variables: ticket.variables.clone(),
    };
    let result = shared
        .gateway
        .compute_visualization(&ticket.session_id, &request, DataSource::Merged)
        .await;

    shared.update(|inner| {
        if !inner.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                chart = chart_type.as_str(),
                "Dropping stale visualization result."
            );
            return;
        }
        match result {
            Ok(Visualization::Matrix(matrix)) => inner.matrix = Some(matrix),
            Ok(Visualization::TimeSeries(series)) => inner.time_series = Some(series),
            Err(e) => {
                let error = match chart_type {
                    ChartType::CorrelationMatrix => {
                        inner.matrix = None;
                        WorkflowError::MatrixVisualizationFailed(e.detail())
                    }
                    ChartType::TimeSeries => {
                        inner.time_series = None;
                        WorkflowError::TimeSeriesVisualizationFailed(e.detail())
                    }
                };
                tracing::warn!(error = %error, "Visualization request failed.");
                inner.status.error = Some(error.to_string());
            }
        }
    });
}
