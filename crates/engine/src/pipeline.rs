use crate::error::WorkflowError;
use crate::refresh;
use crate::state::Shared;
use core_types::{AnalysisInput, RefreshPhase, SessionId, SessionState, StatusState, VariableCatalog};
use std::sync::Arc;

/// How a call to [`crate::Workspace::start_pipeline`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A new session and catalog were published.
    Completed { session_id: SessionId, variables: usize },
    /// The run stopped at the given step; the message is in the status slot.
    Failed(WorkflowError),
    /// A newer run started before this one settled; its results were discarded.
    Superseded,
}

/// Runs upload → stock analysis → variable discovery for one input snapshot.
pub(crate) async fn run(shared: &Arc<Shared>, input: AnalysisInput) -> PipelineOutcome {
    let file = match validate(&input) {
        Ok(file) => file,
        Err(error) => {
            tracing::warn!(error = %error, "Analysis input rejected.");
            shared.update(|inner| inner.status.error = Some(error.to_string()));
            return PipelineOutcome::Failed(error);
        }
    };

    let run_id = shared.update(|inner| {
        inner.run += 1;
        inner.cancel_debounce();
        inner.session = None;
        inner.catalog = VariableCatalog::empty();
        inner.findings.clear();
        inner.clear_visualizations();
        inner.phase = RefreshPhase::Idle;
        // Invalidates any refresh still in flight for the previous session.
        inner.generation += 1;
        inner.status = StatusState {
            busy: true,
            error: None,
        };
        inner.run
    });
    tracing::info!(
        run = run_id,
        file = %file.name,
        bytes = file.len(),
        symbol = %input.stock_symbol,
        "Starting analysis pipeline."
    );

    // 1) Upload
    let receipt = match shared.gateway.upload(file).await {
        Ok(receipt) => receipt,
        Err(e) => return settle_failure(shared, run_id, WorkflowError::upload(&e)),
    };
    if is_superseded(shared, run_id) {
        return PipelineOutcome::Superseded;
    }
    let session_id = receipt.session_id;
    tracing::info!(run = run_id, session = %session_id, rows = receipt.summary.total_rows, "Dataset uploaded.");

    // 2) Stock analysis, gaps in the date range filled from the upload
    let query = input.stock_query(receipt.summary.inferred_range.as_ref());
    let findings = match shared.gateway.analyze_stock(&session_id, &query).await {
        Ok(findings) => findings,
        Err(e) => return settle_failure(shared, run_id, WorkflowError::stock_analysis(&e)),
    };
    if is_superseded(shared, run_id) {
        return PipelineOutcome::Superseded;
    }
    tracing::info!(
        run = run_id,
        start = ?query.start_date,
        end = ?query.end_date,
        findings = findings.len(),
        "Stock analysis complete."
    );

    // 3) Variable discovery
    let info = match shared.gateway.get_variables(&session_id).await {
        Ok(info) => info,
        Err(e) => return settle_failure(shared, run_id, WorkflowError::variable_discovery(&e)),
    };
    let catalog = VariableCatalog::new(info.merged_numeric_columns.unwrap_or_default());
    if catalog.is_empty() {
        return settle_failure(shared, run_id, WorkflowError::NoVariablesFound);
    }

    let variables = catalog.all().len();
    let session = SessionState {
        session_id: session_id.clone(),
        query,
        upload: receipt.summary,
    };
    let published = shared.update(|inner| {
        if inner.run != run_id {
            return false;
        }
        inner.session = Some(session);
        inner.catalog = catalog;
        inner.findings = findings;
        inner.clear_visualizations();
        inner.status.busy = false;
        refresh::on_change(shared, inner);
        true
    });
    if !published {
        return PipelineOutcome::Superseded;
    }

    tracing::info!(run = run_id, session = %session_id, variables, "Analysis pipeline complete.");
    PipelineOutcome::Completed {
        session_id,
        variables,
    }
}

fn validate(input: &AnalysisInput) -> Result<&core_types::UploadFile, WorkflowError> {
    let file = input.file.as_ref().ok_or(WorkflowError::MissingFile)?;
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if start > end {
            return Err(WorkflowError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }
    Ok(file)
}

fn is_superseded(shared: &Shared, run_id: u64) -> bool {
    let superseded = shared.read(|inner| inner.run != run_id);
    if superseded {
        tracing::info!(run = run_id, "Pipeline run superseded by a newer one, discarding.");
    }
    superseded
}

fn settle_failure(shared: &Shared, run_id: u64, error: WorkflowError) -> PipelineOutcome {
    let owned = shared.update(|inner| {
        if inner.run != run_id {
            return false;
        }
        inner.status = StatusState {
            busy: false,
            error: Some(error.to_string()),
        };
        true
    });
    if !owned {
        tracing::info!(run = run_id, error = %error, "Superseded pipeline run failed, ignoring.");
        return PipelineOutcome::Superseded;
    }
    tracing::warn!(run = run_id, error = %error, "Analysis pipeline failed.");
    PipelineOutcome::Failed(error)
}
