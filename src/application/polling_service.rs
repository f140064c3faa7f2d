// Polling service - periodic fetch with fan-out to subscribers
use crate::application::factory_api::{FactoryApi, FetchError};
use crate::application::subscribers::{Subscribers, Subscription};
use crate::application::ticker::Ticker;
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::station::StationSnapshot;
use crate::domain::stock::StockItem;
use crate::infrastructure::fallback;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::Instant;

/// One independently fetched payload stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    /// Factory KPI summary
    Dashboard,
    /// Per-station KPI list
    Stations,
    /// Per-station live status for the 2D twin
    Twin,
    Stocks,
}

impl Feed {
    pub fn as_str(self) -> &'static str {
        match self {
            Feed::Dashboard => "dashboard",
            Feed::Stations => "stations",
            Feed::Twin => "twin",
            Feed::Stocks => "stocks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum FeedData {
    Dashboard(DashboardSnapshot),
    Stations(Vec<StationSnapshot>),
    Twin(Vec<StationSnapshot>),
    Stocks(Vec<StockItem>),
}

impl FeedData {
    pub fn feed(&self) -> Feed {
        match self {
            FeedData::Dashboard(_) => Feed::Dashboard,
            FeedData::Stations(_) => Feed::Stations,
            FeedData::Twin(_) => Feed::Twin,
            FeedData::Stocks(_) => Feed::Stocks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Live,
    Fallback,
}

/// What subscribers receive. Every subscriber of one tick gets the same
/// `Arc`, never a copy.
#[derive(Debug, Clone)]
pub enum Notification {
    Data { data: Arc<FeedData>, origin: Origin },
    Error { message: Arc<str> },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Data { data, .. } => data.feed().as_str(),
            Notification::Error { .. } => "error",
        }
    }
}

/// What a failed tick tells subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Synthetic placeholder payload for every feed
    #[default]
    Fallback,
    /// A single error notification
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Connecting,
    Connected,
    Error,
}

#[derive(Debug, Clone)]
pub struct PollingOptions {
    pub feeds: Vec<Feed>,
    pub request_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub cache_ttl: Duration,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self {
            feeds: vec![Feed::Dashboard, Feed::Stations],
            request_timeout: Duration::from_secs(5),
            failure_policy: FailurePolicy::Fallback,
            cache_ttl: Duration::from_secs(10),
        }
    }
}

struct Inner {
    api: Arc<dyn FactoryApi>,
    options: PollingOptions,
    subscribers: Subscribers<Notification>,
    ticker: Mutex<Option<Ticker>>,
    /// Bumped on every start and stop; a tick only publishes if the
    /// generation it was started under is still current.
    generation: AtomicU64,
    cache: RwLock<HashMap<Feed, (Instant, Arc<FeedData>)>>,
    connectivity: RwLock<Connectivity>,
}

/// Explicitly constructed polling service. Clones share one instance.
#[derive(Clone)]
pub struct PollingService {
    inner: Arc<Inner>,
}

impl PollingService {
    pub fn new(api: Arc<dyn FactoryApi>, options: PollingOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                options,
                subscribers: Subscribers::new(),
                ticker: Mutex::new(None),
                generation: AtomicU64::new(0),
                cache: RwLock::new(HashMap::new()),
                connectivity: RwLock::new(Connectivity::Connecting),
            }),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Fetch now and then every `interval`. A second call while polling is
    /// a no-op. A zero interval is refused and leaves the service stopped.
    pub fn start_polling(&self, interval: Duration) {
        let mut ticker = self.inner.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            tracing::debug!("Polling already running, ignoring start");
            return;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = self.inner.clone();
        let spawned = Ticker::spawn(interval, move || {
            let inner = inner.clone();
            async move { inner.fetch_data(generation).await }
        });
        match spawned {
            Ok(spawned) => {
                *ticker = Some(spawned);
                tracing::info!(
                    "Polling {} feed(s) every {} ms",
                    self.inner.options.feeds.len(),
                    interval.as_millis()
                );
            }
            Err(e) => {
                *ticker = None;
                tracing::error!("Polling not started: {}", e);
            }
        }
    }

    /// Cancel future ticks. Results of requests still in flight are dropped.
    pub fn stop_polling(&self) {
        let mut ticker = self.inner.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ticker) = ticker.take() {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            ticker.cancel();
            tracing::info!("Polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        let ticker = self.inner.ticker.lock().unwrap_or_else(|e| e.into_inner());
        ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and forget every subscriber.
    pub fn dispose(&self) {
        self.stop_polling();
        self.inner.subscribers.clear();
    }

    /// Last live payload of `feed` if it is still fresh.
    pub fn cached(&self, feed: Feed) -> Option<Arc<FeedData>> {
        let cache = self.inner.cache.read().unwrap_or_else(|e| e.into_inner());
        cache
            .get(&feed)
            .filter(|(received, _)| received.elapsed() <= self.inner.options.cache_ttl)
            .map(|(_, data)| data.clone())
    }

    pub fn connectivity(&self) -> Connectivity {
        *self.inner.connectivity.read().unwrap_or_else(|e| e.into_inner())
    }

    /// One-shot lookup outside the polling cycle.
    pub async fn station_kpi(&self, station_id: &str) -> Result<StationSnapshot, FetchError> {
        let timeout = self.inner.options.request_timeout;
        match tokio::time::timeout(timeout, self.inner.api.station_kpi(station_id)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                endpoint: format!("station/{}", station_id),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

impl Inner {
    /// One tick: fetch every feed, then publish exactly one notification set.
    async fn fetch_data(&self, generation: u64) {
        let fetches = self.options.feeds.iter().map(|feed| self.fetch_feed(*feed));
        let results = futures::future::join_all(fetches).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Dropping results of a tick from a stopped polling run");
            return;
        }

        let mut payloads = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(data) => payloads.push(data),
                Err(e) => failures.push(e),
            }
        }

        if failures.is_empty() {
            self.publish_live(payloads);
        } else {
            self.publish_failure(&failures);
        }
    }

    async fn fetch_feed(&self, feed: Feed) -> Result<FeedData, FetchError> {
        let request = async {
            Ok::<FeedData, FetchError>(match feed {
                Feed::Dashboard => FeedData::Dashboard(self.api.factory_summary().await?),
                Feed::Stations => FeedData::Stations(self.api.latest_station_kpis().await?),
                Feed::Twin => FeedData::Twin(self.api.station_statuses().await?),
                Feed::Stocks => FeedData::Stocks(self.api.stocks().await?),
            })
        };

        match tokio::time::timeout(self.options.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                endpoint: feed.as_str().to_string(),
                timeout_ms: self.options.request_timeout.as_millis() as u64,
            }),
        }
    }

    fn publish_live(&self, payloads: Vec<FeedData>) {
        let now = Instant::now();
        let payloads: Vec<Arc<FeedData>> = payloads.into_iter().map(Arc::new).collect();
        {
            let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
            for data in &payloads {
                cache.insert(data.feed(), (now, data.clone()));
            }
        }
        self.set_connectivity(Connectivity::Connected);

        for data in payloads {
            self.subscribers.notify(&Notification::Data { data, origin: Origin::Live });
        }
    }

    fn publish_failure(&self, failures: &[FetchError]) {
        for failure in failures {
            tracing::warn!("Backend fetch failed: {}", failure);
        }
        self.set_connectivity(Connectivity::Error);

        match self.options.failure_policy {
            FailurePolicy::Fallback => {
                for feed in &self.options.feeds {
                    let data = Arc::new(fallback::payload(*feed));
                    self.subscribers.notify(&Notification::Data { data, origin: Origin::Fallback });
                }
            }
            FailurePolicy::Error => {
                let message: Arc<str> = failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
                    .into();
                self.subscribers.notify(&Notification::Error { message });
            }
        }
    }

    fn set_connectivity(&self, state: Connectivity) {
        let mut connectivity = self.connectivity.write().unwrap_or_else(|e| e.into_inner());
        if *connectivity != state {
            tracing::info!("Backend connectivity: {:?} -> {:?}", *connectivity, state);
            *connectivity = state;
        }
    }
}
