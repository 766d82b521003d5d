use crate::error::ApiError;
use crate::responses::{SessionList, StockAnalysisResponse, UploadResponse};
use async_trait::async_trait;
use configuration::GatewayConfig;
use core_types::{CorrelationFinding, DataSource, SessionId, StockQuery, UploadFile, Visualization};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use url::Url;

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::{
    DataInfo, HealthReport, SessionSummary, UploadReceipt, VisualizationRequest,
    VisualizationResponse,
};

/// The abstract interface to the remote analysis service.
///
/// The workflow engine only ever talks to this trait, so the HTTP client can be
/// swapped for a scripted fake in tests.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Uploads a dataset and opens a new server-side session for it.
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, ApiError>;

    /// Fetches the stock history, merges it into the session and correlates the two.
    async fn analyze_stock(
        &self,
        session_id: &SessionId,
        query: &StockQuery,
    ) -> Result<Vec<CorrelationFinding>, ApiError>;

    /// Describes the columns held by a session.
    async fn get_variables(&self, session_id: &SessionId) -> Result<DataInfo, ApiError>;

    /// Computes one chart over the given variables.
    async fn compute_visualization(
        &self,
        session_id: &SessionId,
        request: &VisualizationRequest,
        source: DataSource,
    ) -> Result<Visualization, ApiError>;

    async fn health(&self) -> Result<HealthReport, ApiError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;
}

/// The `reqwest`-backed implementation of [`AnalysisGateway`].
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let detail = responses::error_detail(status, &text);
            tracing::debug!(status = status.as_u16(), %detail, "Analysis service returned an error.");
            Err(ApiError::Upstream {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

#[async_trait]
impl AnalysisGateway for HttpGateway {
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, ApiError> {
        let url = self.endpoint(&["upload"])?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response: UploadResponse = self.send(self.client.post(url).multipart(form)).await?;
        Ok(response.into())
    }

    async fn analyze_stock(
        &self,
        session_id: &SessionId,
        query: &StockQuery,
    ) -> Result<Vec<CorrelationFinding>, ApiError> {
        let url = self.endpoint(&["stock-analysis", session_id.as_str()])?;
        let response: StockAnalysisResponse = self.send(self.client.post(url).json(query)).await?;
        Ok(response.correlations)
    }

    async fn get_variables(&self, session_id: &SessionId) -> Result<DataInfo, ApiError> {
        let url = self.endpoint(&["data", session_id.as_str(), "info"])?;
        self.send(self.client.get(url)).await
    }

    async fn compute_visualization(
        &self,
        session_id: &SessionId,
        request: &VisualizationRequest,
        source: DataSource,
    ) -> Result<Visualization, ApiError> {
        let url = self.endpoint(&["visualization", session_id.as_str()])?;
        let response: VisualizationResponse = self
            .send(
                self.client
                    .post(url)
                    .query(&[("source", source.as_str())])
                    .json(request),
            )
            .await?;
        response.into_visualization(request.chart_type)
    }

    async fn health(&self) -> Result<HealthReport, ApiError> {
        let url = self.endpoint(&["health"])?;
        self.send(self.client.get(url)).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let url = self.endpoint(&["sessions"])?;
        let list: SessionList = self.send(self.client.get(url)).await?;
        Ok(list.sessions)
    }
}
