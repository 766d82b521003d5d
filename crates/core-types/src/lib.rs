//! # Core Types
//!
//! Plain data shared by every crate in the workspace: what the user submits,
//! what the gateway hands back, and the client-held session and selection state.

pub mod analysis;
pub mod catalog;
pub mod enums;
pub mod error;
pub mod session;
pub mod status;
pub mod visualization;

// Re-export the core types to provide a clean public API.
pub use analysis::{AnalysisInput, DateRange, StockQuery, UploadFile};
pub use catalog::VariableCatalog;
pub use enums::{ChartType, DataSource, RefreshPhase};
pub use error::CoreError;
pub use session::{ConfidenceInterval, CorrelationFinding, SessionId, SessionState, UploadSummary};
pub use status::StatusState;
pub use visualization::{CorrelationMatrix, Series, TimeSeries, Visualization};
