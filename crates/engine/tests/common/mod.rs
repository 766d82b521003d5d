//! A scripted, in-memory analysis gateway for driving a `Workspace` in tests.

#![allow(dead_code)]

use api_client::error::ApiError;
use api_client::{AnalysisGateway, DataInfo, HealthReport, SessionSummary, UploadReceipt, VisualizationRequest};
use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::RefreshConfig;
use core_types::{
    AnalysisInput, ChartType, CorrelationFinding, CorrelationMatrix, DataSource, DateRange,
    Series, SessionId, StockQuery, TimeSeries, UploadFile, UploadSummary, Visualization,
};
use engine::Workspace;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// A request the fake received, recorded before it is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload(String),
    AnalyzeStock(SessionId, StockQuery),
    GetVariables(SessionId),
    Visualize(SessionId, ChartType, Vec<String>),
}

/// A call that can be held open until the test releases it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Gate {
    /// The upload that will return this session.
    Upload(String),
    /// Every visualization request against this session.
    Visualize(String),
}

/// What the fake answers. Uploads hand out `sessions` in order.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Session id and the `merged_numeric_columns` reported for it.
    pub sessions: Vec<(String, Option<Vec<String>>)>,
    pub inferred_range: Option<DateRange>,
    pub upload_error: Option<String>,
    pub stock_error: Option<String>,
    pub variables_error: Option<String>,
    pub matrix_error: Option<String>,
    pub series_error: Option<String>,
}

impl Script {
    pub fn with_session(mut self, id: &str, variables: &[&str]) -> Self {
        self.sessions.push((
            id.to_string(),
            Some(variables.iter().map(|v| v.to_string()).collect()),
        ));
        self
    }
}

pub struct FakeGateway {
    script: Script,
    next_session: AtomicUsize,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<Gate, watch::Sender<bool>>>,
}

impl FakeGateway {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            next_session: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Visualization requests received so far, as `(session, chart, variables)`.
    pub fn visualize_calls(&self) -> Vec<(String, ChartType, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Visualize(s, chart, vars) => Some((s.as_str().to_string(), chart, vars)),
                _ => None,
            })
            .collect()
    }

    /// Holds matching calls until [`FakeGateway::release`] is called.
    pub fn hold(&self, gate: Gate) {
        let (tx, _) = watch::channel(false);
        self.gates.lock().unwrap().insert(gate, tx);
    }

    pub fn release(&self, gate: &Gate) {
        if let Some(tx) = self.gates.lock().unwrap().get(gate) {
            tx.send_replace(true);
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass(&self, gate: Gate) {
        let rx = self.gates.lock().unwrap().get(&gate).map(|tx| tx.subscribe());
        if let Some(mut rx) = rx {
            let _ = rx.wait_for(|open| *open).await;
        }
    }

    fn variables_for(&self, session: &SessionId) -> Option<Vec<String>> {
        self.script
            .sessions
            .iter()
            .find(|(id, _)| id == session.as_str())
            .and_then(|(_, vars)| vars.clone())
    }
}

fn upstream(status: u16, detail: &str) -> ApiError {
    ApiError::Upstream {
        status,
        detail: detail.to_string(),
    }
}

#[async_trait]
impl AnalysisGateway for FakeGateway {
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, ApiError> {
        self.record(Call::Upload(file.name.clone()));
        if let Some(detail) = &self.script.upload_error {
            return Err(upstream(400, detail));
        }
        let index = self.next_session.fetch_add(1, Ordering::SeqCst);
        let Some((id, _)) = self.script.sessions.get(index) else {
            return Err(upstream(500, "no scripted session left"));
        };
        self.pass(Gate::Upload(id.clone())).await;
        Ok(UploadReceipt {
            session_id: SessionId::new(id.clone()),
            summary: UploadSummary {
                total_rows: 181,
                date_column: "date".to_string(),
                numeric_columns: Vec::new(),
                inferred_range: self.script.inferred_range,
            },
        })
    }

    async fn analyze_stock(
        &self,
        session_id: &SessionId,
        query: &StockQuery,
    ) -> Result<Vec<CorrelationFinding>, ApiError> {
        self.record(Call::AnalyzeStock(session_id.clone(), query.clone()));
        if let Some(detail) = &self.script.stock_error {
            return Err(upstream(400, detail));
        }
        Ok(vec![CorrelationFinding {
            stock_variable: "Close".to_string(),
            custom_variable: "rainfall".to_string(),
            correlation: 0.61,
            p_value: 0.002,
            method: "pearson".to_string(),
            n_observations: 120,
            significant: true,
            confidence_interval: None,
        }])
    }

    async fn get_variables(&self, session_id: &SessionId) -> Result<DataInfo, ApiError> {
        self.record(Call::GetVariables(session_id.clone()));
        if let Some(detail) = &self.script.variables_error {
            return Err(upstream(404, detail));
        }
        Ok(DataInfo {
            session_id: session_id.clone(),
            total_rows: 181,
            total_columns: 4,
            date_column: "date".to_string(),
            numeric_columns: Vec::new(),
            merged_numeric_columns: self.variables_for(session_id),
        })
    }

    async fn compute_visualization(
        &self,
        session_id: &SessionId,
        request: &VisualizationRequest,
        source: DataSource,
    ) -> Result<Visualization, ApiError> {
        assert_eq!(source, DataSource::Merged);
        self.record(Call::Visualize(
            session_id.clone(),
            request.chart_type,
            request.variables.clone(),
        ));
        self.pass(Gate::Visualize(session_id.as_str().to_string())).await;

        let vars = &request.variables;
        match request.chart_type {
            ChartType::CorrelationMatrix => {
                if let Some(detail) = &self.script.matrix_error {
                    return Err(upstream(400, detail));
                }
                let values = (0..vars.len())
                    .map(|i| (0..vars.len()).map(|j| if i == j { 1.0 } else { 0.5 }).collect())
                    .collect();
                Ok(Visualization::Matrix(
                    CorrelationMatrix::new(vars.clone(), values).unwrap(),
                ))
            }
            ChartType::TimeSeries => {
                if let Some(detail) = &self.script.series_error {
                    return Err(upstream(400, detail));
                }
                let series = vars
                    .iter()
                    .map(|name| Series {
                        name: name.clone(),
                        x: vec!["2023-01-02".to_string(), "2023-01-03".to_string()],
                        y: vec![Some(1.0), Some(2.0)],
                    })
                    .collect();
                Ok(Visualization::TimeSeries(TimeSeries::new(series).unwrap()))
            }
        }
    }

    async fn health(&self) -> Result<HealthReport, ApiError> {
        Err(upstream(501, "not scripted"))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        Ok(Vec::new())
    }
}

pub fn workspace(gateway: &Arc<FakeGateway>) -> Workspace {
    Workspace::new(gateway.clone(), RefreshConfig::default())
}

pub fn csv_input() -> AnalysisInput {
    AnalysisInput::new("AAPL").with_file(UploadFile::new("weather.csv", b"date,rainfall\n".to_vec()))
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}
