use crate::analysis::{DateRange, StockQuery};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The opaque identifier the gateway assigns to an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the gateway reported about an accepted upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub total_rows: u64,
    pub date_column: String,
    pub numeric_columns: Vec<String>,
    /// The first and last dates found in the dataset, when the gateway could tell.
    pub inferred_range: Option<DateRange>,
}

/// Fisher-z interval around a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
}

/// One stock-vs-dataset correlation found by the stock-analysis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFinding {
    pub stock_variable: String,
    pub custom_variable: String,
    pub correlation: f64,
    pub p_value: f64,
    pub method: String,
    pub n_observations: u64,
    pub significant: bool,
    #[serde(default)]
    pub confidence_interval: Option<ConfidenceInterval>,
}

/// The session produced by a successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session_id: SessionId,
    /// The query actually sent to the stock-analysis step, gaps already filled.
    pub query: StockQuery,
    pub upload: UploadSummary,
}
