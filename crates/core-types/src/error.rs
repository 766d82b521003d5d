use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid correlation matrix: {0}")]
    InvalidMatrix(String),

    #[error("Invalid time series: {0}")]
    InvalidTimeSeries(String),
}
