use crate::error::CoreError;
use serde::{Deserialize, Serialize};

// Pairwise coefficients routinely land a rounding step outside [-1, 1].
const COEFFICIENT_TOLERANCE: f64 = 1e-9;

/// A square matrix of pairwise correlation coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Validates the shape and range of a matrix received from the gateway.
    pub fn new(columns: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self, CoreError> {
        if values.len() != columns.len() {
            return Err(CoreError::InvalidMatrix(format!(
                "{} columns but {} rows",
                columns.len(),
                values.len()
            )));
        }
        for (i, row) in values.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CoreError::InvalidMatrix(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
            if let Some(v) = row
                .iter()
                .find(|v| !v.is_finite() || v.abs() > 1.0 + COEFFICIENT_TOLERANCE)
            {
                return Err(CoreError::InvalidMatrix(format!(
                    "row {} holds out-of-range coefficient {}",
                    i, v
                )));
            }
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Looks a coefficient up by variable names.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }
}

/// One line of a time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<String>,
    /// `None` where the source row had no value for this variable.
    pub y: Vec<Option<f64>>,
}

/// Several variables plotted against a shared date axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    series: Vec<Series>,
}

impl TimeSeries {
    pub fn new(series: Vec<Series>) -> Result<Self, CoreError> {
        if let Some(first) = series.first() {
            let len = first.x.len();
            for s in &series {
                if s.x.len() != len {
                    return Err(CoreError::InvalidTimeSeries(format!(
                        "series '{}' has {} points on x, expected {}",
                        s.name,
                        s.x.len(),
                        len
                    )));
                }
                if s.y.len() != s.x.len() {
                    return Err(CoreError::InvalidTimeSeries(format!(
                        "series '{}' has {} x labels but {} y values",
                        s.name,
                        s.x.len(),
                        s.y.len()
                    )));
                }
            }
        }
        Ok(Self { series })
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Number of points on the shared x axis.
    pub fn len(&self) -> usize {
        self.series.first().map_or(0, |s| s.x.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A computed chart, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    Matrix(CorrelationMatrix),
    TimeSeries(TimeSeries),
}
