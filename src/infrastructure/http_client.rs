// Factory backend client over HTTP
use crate::application::factory_api::{FactoryApi, FetchError};
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::station::StationSnapshot;
use crate::domain::stock::StockItem;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;

const FACTORY_SUMMARY: &str = "/api/kpi/factory/summary";
const LATEST_KPIS: &str = "/api/kpi/latest";
const STATION_STATUS: &str = "/api/station/status/all";
const STOCKS: &str = "/api/stocks";

#[derive(Debug, Clone)]
pub struct HttpFactoryApi {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFactoryApi {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn station_kpi_path(station_id: &str) -> String {
        format!("/api/kpi/station/{}", urlencoding::encode(station_id))
    }

    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { endpoint: path.to_string(), status: status.as_u16() });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(path, e)
            } else {
                FetchError::Decode { endpoint: path.to_string(), message: e.to_string() }
            }
        })
    }

    fn transport_error(&self, path: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout { endpoint: path.to_string(), timeout_ms: self.timeout.as_millis() as u64 }
        } else {
            FetchError::Network { endpoint: path.to_string(), message: e.to_string() }
        }
    }
}

fn decode_error(path: &str, e: serde_json::Error) -> FetchError {
    FetchError::Decode { endpoint: path.to_string(), message: e.to_string() }
}

#[async_trait]
impl FactoryApi for HttpFactoryApi {
    async fn factory_summary(&self) -> Result<DashboardSnapshot, FetchError> {
        let body = self.get_json(FACTORY_SUMMARY).await?;
        DashboardSnapshot::from_json(body).map_err(|e| decode_error(FACTORY_SUMMARY, e))
    }

    async fn latest_station_kpis(&self) -> Result<Vec<StationSnapshot>, FetchError> {
        let body = self.get_json(LATEST_KPIS).await?;
        StationSnapshot::list_from_json(body, Utc::now()).map_err(|e| decode_error(LATEST_KPIS, e))
    }

    async fn station_statuses(&self) -> Result<Vec<StationSnapshot>, FetchError> {
        let body = self.get_json(STATION_STATUS).await?;
        StationSnapshot::list_from_json(body, Utc::now()).map_err(|e| decode_error(STATION_STATUS, e))
    }

    async fn stocks(&self) -> Result<Vec<StockItem>, FetchError> {
        let body = self.get_json(STOCKS).await?;
        StockItem::list_from_json(body).map_err(|e| decode_error(STOCKS, e))
    }

    async fn station_kpi(&self, station_id: &str) -> Result<StationSnapshot, FetchError> {
        let path = Self::station_kpi_path(station_id);
        let body = self.get_json(&path).await?;
        // the endpoint answers with one record; reuse the list ingestion
        let mut stations = StationSnapshot::list_from_json(Value::Array(vec![body]), Utc::now())
            .map_err(|e| decode_error(&path, e))?;
        stations.pop().ok_or_else(|| FetchError::Decode {
            endpoint: path.clone(),
            message: "station record is not an object".to_string(),
        })
    }
}
