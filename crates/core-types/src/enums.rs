use serde::{Deserialize, Serialize};

/// The two derived charts the gateway can compute for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    CorrelationMatrix,
    TimeSeries,
}

impl ChartType {
    /// The wire name used in the `chart_type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::CorrelationMatrix => "correlation_matrix",
            ChartType::TimeSeries => "time_series",
        }
    }
}

/// Which server-side table a visualization is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The uploaded dataset on its own.
    Custom,
    /// The uploaded dataset joined with the stock history.
    #[default]
    Merged,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Custom => "custom",
            DataSource::Merged => "merged",
        }
    }
}

/// Lifecycle of the visualization refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefreshPhase {
    #[default]
    Idle,
    /// A refresh is scheduled and waiting out the quiet period.
    Debouncing,
    /// Both chart requests are in flight.
    Fetching,
}
