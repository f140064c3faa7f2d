// Factory backend trait - the seam between polling and HTTP
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::station::StationSnapshot;
use crate::domain::stock::StockItem;
use async_trait::async_trait;
use thiserror::Error;

/// Everything that can go wrong fetching one payload.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },

    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("unexpected payload from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("{endpoint} did not answer within {timeout_ms} ms")]
    Timeout { endpoint: String, timeout_ms: u64 },
}

#[async_trait]
pub trait FactoryApi: Send + Sync {
    /// Factory-wide production and KPI summary
    async fn factory_summary(&self) -> Result<DashboardSnapshot, FetchError>;

    /// Latest KPI record of every station
    async fn latest_station_kpis(&self) -> Result<Vec<StationSnapshot>, FetchError>;

    /// Live status of every station, including work progress for the twin
    async fn station_statuses(&self) -> Result<Vec<StationSnapshot>, FetchError>;

    /// Warehouse inventory
    async fn stocks(&self) -> Result<Vec<StockItem>, FetchError>;

    /// Latest KPI record of one station
    async fn station_kpi(&self, station_id: &str) -> Result<StationSnapshot, FetchError>;
}
