use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to reach the analysis service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The analysis service returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// The human-readable text shown to the user for this failure.
    ///
    /// For an error response this is the server's own `detail`, verbatim.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Upstream { detail, .. } => detail.clone(),
            ApiError::Transport(e) => e.to_string(),
            ApiError::Deserialization(msg) | ApiError::InvalidData(msg) | ApiError::InvalidUrl(msg) => {
                msg.clone()
            }
        }
    }
}
