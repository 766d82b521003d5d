use crate::error::ApiError;
use chrono::NaiveDateTime;
use core_types::{
    ChartType, CorrelationFinding, CorrelationMatrix, DateRange, Series, SessionId, TimeSeries,
    UploadSummary, Visualization,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

// The gateway speaks snake_case JSON, so the structs below map field-for-field.

/// The body of `POST /visualization/{session_id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationRequest {
    pub chart_type: ChartType,
    pub variables: Vec<String>,
}

/// The response from a successful `POST /upload` request.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub session_id: SessionId,
    pub validation_result: ValidationResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationResult {
    pub total_rows: u64,
    pub date_column: String,
    pub numeric_columns: Vec<String>,
    #[serde(default)]
    pub data_quality: Option<DataQuality>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataQuality {
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// A successful upload: the new session plus what the server learned about the file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub session_id: SessionId,
    pub summary: UploadSummary,
}

impl From<UploadResponse> for UploadReceipt {
    fn from(response: UploadResponse) -> Self {
        let v = response.validation_result;
        Self {
            session_id: response.session_id,
            summary: UploadSummary {
                total_rows: v.total_rows,
                date_column: v.date_column,
                numeric_columns: v.numeric_columns,
                inferred_range: v.data_quality.and_then(|q| q.date_range),
            },
        }
    }
}

/// The response from `POST /stock-analysis/{session_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StockAnalysisResponse {
    pub correlations: Vec<CorrelationFinding>,
}

/// The response from `GET /data/{session_id}/info`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataInfo {
    pub session_id: SessionId,
    pub total_rows: u64,
    pub total_columns: u64,
    pub date_column: String,
    pub numeric_columns: Vec<String>,
    /// Only present once a stock analysis has been merged into the session.
    #[serde(default)]
    pub merged_numeric_columns: Option<Vec<String>>,
}

/// The `data` block of a correlation-matrix response.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixData {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// One plotted line of a time-series response. Plot styling fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<Option<String>>,
    pub y: Vec<Option<f64>>,
}

/// A computed chart as sent by the gateway, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum VisualizationResponse {
    CorrelationMatrix(MatrixData),
    TimeSeries(Vec<Trace>),
}

impl VisualizationResponse {
    pub fn chart_type(&self) -> ChartType {
        match self {
            VisualizationResponse::CorrelationMatrix(_) => ChartType::CorrelationMatrix,
            VisualizationResponse::TimeSeries(_) => ChartType::TimeSeries,
        }
    }

    /// Validates the payload against the chart type that was asked for.
    pub fn into_visualization(self, expected: ChartType) -> Result<Visualization, ApiError> {
        if self.chart_type() != expected {
            return Err(ApiError::InvalidData(format!(
                "asked for {} but received {}",
                expected.as_str(),
                self.chart_type().as_str()
            )));
        }
        match self {
            VisualizationResponse::CorrelationMatrix(MatrixData { columns, values }) => {
                let values = values
                    .into_iter()
                    .enumerate()
                    .map(|(i, row)| {
                        row.into_iter()
                            .collect::<Option<Vec<f64>>>()
                            .ok_or_else(|| {
                                ApiError::InvalidData(format!("correlation row {} has a missing value", i))
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                CorrelationMatrix::new(columns, values)
                    .map(Visualization::Matrix)
                    .map_err(|e| ApiError::InvalidData(e.to_string()))
            }
            VisualizationResponse::TimeSeries(traces) => {
                let series = traces
                    .into_iter()
                    .map(|t| Series {
                        name: t.name,
                        x: t.x.into_iter().map(Option::unwrap_or_default).collect(),
                        y: t.y,
                    })
                    .collect();
                TimeSeries::new(series)
                    .map(Visualization::TimeSeries)
                    .map_err(|e| ApiError::InvalidData(e.to_string()))
            }
        }
    }
}

/// The response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: NaiveDateTime,
    pub active_sessions: u64,
}

/// One entry of `GET /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub created_at: NaiveDateTime,
    pub last_accessed: NaiveDateTime,
    pub total_rows: u64,
    pub total_columns: u64,
    pub date_column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionList {
    pub sessions: Vec<SessionSummary>,
}

/// Represents an error response from the analysis service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Extracts the user-facing message from a failed response body.
///
/// Uses the server's `detail` verbatim when it is a string, its JSON text when
/// it is structured (validation errors), and otherwise the HTTP reason phrase.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .map(|r| r.detail);
    match detail {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Null) | None => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        Some(other) => other.to_string(),
    }
}
