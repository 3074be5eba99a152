use crawler_logging::{crawler_debug, crawler_info};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::wire::{
    ErrorBody, ExtractBody, ExtractReply, HistoryEntry, ScheduleBody, ScheduleEntry,
    ScheduleReply, StopAllReply,
};
use crate::{ApiCall, ApiError, ApiReply, ApiSettings, FailureKind};

/// Boundary to the remote scraping service.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn extract(&self, body: &ExtractBody) -> Result<ExtractReply, ApiError>;

    /// Most recent records first, as ordered by the service.
    async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, ApiError>;

    async fn register_schedule(&self, body: &ScheduleBody) -> Result<ScheduleReply, ApiError>;

    /// Deactivates every schedule on the service.
    async fn stop_all_schedules(&self) -> Result<StopAllReply, ApiError>;

    async fn active_schedules(&self) -> Result<Vec<ScheduleEntry>, ApiError>;

    async fn health(&self) -> Result<(), ApiError>;

    /// Dispatches a queued call to the matching method.
    async fn perform(&self, call: &ApiCall) -> Result<ApiReply, ApiError> {
        match call {
            ApiCall::Extract(body) => self.extract(body).await.map(ApiReply::Extracted),
            ApiCall::History { limit } => self.history(*limit).await.map(ApiReply::History),
            ApiCall::RegisterSchedule(body) => {
                self.register_schedule(body).await.map(ApiReply::Registered)
            }
            ApiCall::StopAllSchedules => self.stop_all_schedules().await.map(ApiReply::Stopped),
            ApiCall::ActiveSchedules => {
                self.active_schedules().await.map(ApiReply::ActiveSchedules)
            }
            ApiCall::Health => self.health().await.map(|()| ApiReply::Healthy),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Joins `path` onto the base URL, keeping any path prefix the base has.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut base = self.settings.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        Ok(self.request_to(method, url))
    }

    fn request_to(&self, method: Method, url: Url) -> RequestBuilder {
        crawler_debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn extract(&self, body: &ExtractBody) -> Result<ExtractReply, ApiError> {
        let builder = self.request(Method::POST, "api/extract")?.json(body);
        self.send(builder).await
    }

    async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, ApiError> {
        let mut url = self.endpoint("api/history")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.send(self.request_to(Method::GET, url)).await
    }

    async fn register_schedule(&self, body: &ScheduleBody) -> Result<ScheduleReply, ApiError> {
        let builder = self.request(Method::POST, "api/schedule")?.json(body);
        self.send(builder).await
    }

    async fn stop_all_schedules(&self) -> Result<StopAllReply, ApiError> {
        let builder = self.request(Method::DELETE, "api/schedules/stop-all")?;
        self.send(builder).await
    }

    async fn active_schedules(&self) -> Result<Vec<ScheduleEntry>, ApiError> {
        let builder = self.request(Method::GET, "api/schedules")?;
        self.send(builder).await
    }

    async fn health(&self) -> Result<(), ApiError> {
        let builder = self.request(Method::GET, "")?;
        let _: serde_json::Value = self.send(builder).await?;
        crawler_info!("service at {} is reachable", self.settings.base_url);
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.detail_text())
            .unwrap_or_else(|| status.to_string());
        return Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), detail));
    }

    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
