use api_client::error::ApiError;
use thiserror::Error;

/// Everything that can go wrong in the analysis workflow.
///
/// The `Display` text of each variant is the message shown to the user in the
/// status slot, so gateway details are embedded verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Please select a CSV file.")]
    MissingFile,

    #[error("Start date {start} is after end date {end}.")]
    InvalidDateRange { start: String, end: String },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Stock analysis failed: {0}")]
    StockAnalysisFailed(String),

    #[error("Could not retrieve column information: {0}")]
    VariableDiscoveryFailed(String),

    #[error("Could not retrieve column information")]
    NoVariablesFound,

    #[error("Matrix visualization failed: {0}")]
    MatrixVisualizationFailed(String),

    #[error("Time series visualization failed: {0}")]
    TimeSeriesVisualizationFailed(String),
}

impl WorkflowError {
    pub fn upload(e: &ApiError) -> Self {
        WorkflowError::UploadFailed(e.detail())
    }

    pub fn stock_analysis(e: &ApiError) -> Self {
        WorkflowError::StockAnalysisFailed(e.detail())
    }

    pub fn variable_discovery(e: &ApiError) -> Self {
        WorkflowError::VariableDiscoveryFailed(e.detail())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_embed_server_detail() {
        let e = ApiError::Upstream {
            status: 400,
            detail: "File must be a CSV".to_string(),
        };
        assert_eq!(WorkflowError::upload(&e).to_string(), "Upload failed: File must be a CSV");
        assert_eq!(
            WorkflowError::stock_analysis(&e).to_string(),
            "Stock analysis failed: File must be a CSV"
        );
    }

    #[test]
    fn empty_catalog_message_has_no_detail() {
        assert_eq!(
            WorkflowError::NoVariablesFound.to_string(),
            "Could not retrieve column information"
        );
    }
}
