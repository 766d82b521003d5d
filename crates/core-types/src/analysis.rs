use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dataset picked by the user, held in memory until it is uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// The payload can be megabytes; keep it out of logs.
impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// An inclusive calendar range, as reported by the gateway for an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Everything the user can edit before running an analysis.
///
/// The pipeline clones this when a run starts, so later edits never leak into
/// a run that is already in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisInput {
    pub file: Option<UploadFile>,
    pub stock_symbol: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AnalysisInput {
    pub fn new(stock_symbol: impl Into<String>) -> Self {
        Self {
            file: None,
            stock_symbol: stock_symbol.into(),
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_file(mut self, file: UploadFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Builds the stock-analysis query, filling empty dates from the range the
    /// gateway inferred from the upload. User-supplied dates always win.
    pub fn stock_query(&self, inferred: Option<&DateRange>) -> StockQuery {
        StockQuery {
            stock_symbol: self.stock_symbol.clone(),
            start_date: self.start_date.or(inferred.map(|r| r.start)),
            end_date: self.end_date.or(inferred.map(|r| r.end)),
        }
    }
}

/// The body of a stock-analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuery {
    pub stock_symbol: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
