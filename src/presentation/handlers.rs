// HTTP request handlers
use crate::application::interaction::{ClickTarget, Cursor, DocumentClick, Popover};
use crate::application::polling_service::{Feed, FeedData, Notification, Origin};
use crate::application::subscribers::Subscription;
use crate::application::view_models::{
    inventory_rows, robot_rows, station_rows, ConnectivityBanner, InventoryRow, KpiCards, ProductPanel, RobotRow,
    StationRow,
};
use crate::domain::marker::Marker;
use crate::domain::station::StationSnapshot;
use crate::domain::transform::{Point, RenderTransform, Size};
use crate::infrastructure::http_response::{accepts_brotli, svg_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use chrono::Utc;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub connectivity: ConnectivityBanner,
    pub polling: bool,
    pub origin: Option<Origin>,
    pub kpi: KpiCards,
    pub stations: Vec<StationRow>,
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let summary = state.feeds.get(Feed::Dashboard);
    let snapshot = summary.as_ref().and_then(|(data, _)| match &**data {
        FeedData::Dashboard(snapshot) => Some(snapshot),
        _ => None,
    });
    let stations = match state.feeds.get(Feed::Stations) {
        Some((data, _)) => match &*data {
            FeedData::Stations(stations) => station_rows(stations, Utc::now()),
            _ => Vec::new(),
        },
        None => Vec::new(),
    };

    Json(DashboardView {
        connectivity: state.polling.connectivity().into(),
        polling: state.polling.is_polling(),
        origin: summary.as_ref().map(|(_, origin)| *origin),
        kpi: KpiCards::from_snapshot(snapshot),
        stations,
    })
}

pub async fn inventory(State(state): State<Arc<AppState>>) -> Json<Vec<InventoryRow>> {
    let rows = state
        .feeds
        .get(Feed::Stocks)
        .map(|(data, _)| match &*data {
            FeedData::Stocks(items) => inventory_rows(items),
            _ => Vec::new(),
        })
        .unwrap_or_default();
    Json(rows)
}

/// Fresh polled data first, otherwise a one-shot backend lookup.
pub async fn station(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let fresh = state.polling.cached(Feed::Stations).and_then(|data| match &*data {
        FeedData::Stations(stations) => stations.iter().find(|s| s.station_id == id).cloned(),
        _ => None,
    });
    if let Some(station) = fresh {
        return Json(station).into_response();
    }

    match state.polling.station_kpi(&id).await {
        Ok(station) => Json::<StationSnapshot>(station).into_response(),
        Err(e) => {
            tracing::warn!("Station lookup for {} failed: {}", id, e);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

pub async fn twin_svg(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let svg = state.twin.with_surface(|surface| surface.document());
    if svg.is_empty() {
        return (StatusCode::SERVICE_UNAVAILABLE, "twin has no size yet").into_response();
    }
    match svg_response(svg, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

pub async fn resize_twin(State(state): State<Arc<AppState>>, Json(size): Json<Size>) -> StatusCode {
    state.resize.submit(size);
    StatusCode::ACCEPTED
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinStateView {
    pub transform: Option<RenderTransform>,
    pub markers: Vec<Marker>,
    pub redraws: u64,
    pub popover: Popover,
    pub robots: Vec<RobotRow>,
}

pub async fn twin_state(State(state): State<Arc<AppState>>) -> Json<TwinStateView> {
    let popover = state.twin.popover();
    Json(TwinStateView {
        transform: state.twin.transform(),
        markers: state.twin.markers(),
        redraws: state.twin.redraw_count(),
        robots: robot_rows(&popover),
        popover,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerRequest {
    pub client: Point,
    /// Canvas element's top-left corner in client coordinates
    #[serde(default)]
    pub canvas_origin: Point,
}

pub async fn click_twin(State(state): State<Arc<AppState>>, Json(req): Json<PointerRequest>) -> Json<Popover> {
    Json(state.twin.click(req.client, req.canvas_origin))
}

#[derive(Serialize)]
pub struct HoverView {
    pub cursor: Cursor,
}

pub async fn hover_twin(State(state): State<Arc<AppState>>, Json(req): Json<PointerRequest>) -> Json<HoverView> {
    Json(HoverView { cursor: state.twin.cursor(req.client, req.canvas_origin) })
}

/// A click somewhere in the page outside the twin canvas.
pub async fn outside_click(State(state): State<Arc<AppState>>) -> Json<Popover> {
    state.document_clicks.notify(&DocumentClick { target: ClickTarget::Elsewhere });
    Json(state.twin.popover())
}

pub async fn close_popover(State(state): State<Arc<AppState>>) -> Json<Popover> {
    Json(state.twin.close_popover())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotRequest {
    pub robot_id: u32,
}

pub async fn select_robot(State(state): State<Arc<AppState>>, Json(req): Json<RobotRequest>) -> Response {
    match state.twin.select_robot(req.robot_id) {
        Some(selection) => {
            let robot = &selection.robot;
            tracing::info!("{} selected at {} ({})", robot.name, selection.process, robot.status.label());
            Json(selection).into_response()
        }
        None => (StatusCode::CONFLICT, "no open popover lists that robot").into_response(),
    }
}

pub async fn selected_product(State(state): State<Arc<AppState>>) -> Response {
    match state.twin.selected_station() {
        Some(station) => Json(ProductPanel::new(&station, Utc::now())).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn clear_product(State(state): State<Arc<AppState>>) -> StatusCode {
    state.twin.clear_selection();
    StatusCode::NO_CONTENT
}

#[derive(Serialize)]
#[serde(untagged)]
enum EventBody<'a> {
    Data { origin: Origin, data: &'a FeedData },
    Error { message: &'a str },
}

fn to_event(notification: &Notification) -> Option<Event> {
    let body = match notification {
        Notification::Data { data, origin } => EventBody::Data { origin: *origin, data: &**data },
        Notification::Error { message } => EventBody::Error { message: &**message },
    };
    match Event::default().event(notification.kind()).json_data(body) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!("Failed to encode {} event: {}", notification.kind(), e);
            None
        }
    }
}

/// Removes the stream's listener once the client goes away.
struct Unsubscribe(Option<Subscription>);

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        if let Some(subscription) = self.0.take() {
            subscription.unsubscribe();
            tracing::debug!("Event stream closed");
        }
    }
}

/// Notifications queued per event stream before new ones are dropped.
const EVENT_BUFFER: usize = 64;

/// Listener feeding one client's queue. A client that stops reading loses
/// notifications instead of growing the queue.
fn event_forwarder(tx: mpsc::Sender<Notification>) -> impl Fn(&Notification) + Send + Sync + 'static {
    move |notification| match tx.try_send(notification.clone()) {
        Ok(()) => {}
        Err(TrySendError::Full(dropped)) => {
            tracing::warn!("Event stream lagging, dropped {} notification", dropped.kind());
        }
        Err(TrySendError::Closed(_)) => {}
    }
}

/// Live notifications as server-sent events, one event per notification.
pub async fn events(State(state): State<Arc<AppState>>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, mut rx) = mpsc::channel::<Notification>(EVENT_BUFFER);
    let subscription = state.polling.subscribe(event_forwarder(tx));
    let guard = Unsubscribe(Some(subscription));
    tracing::debug!("Event stream opened, {} listener(s)", state.polling.subscriber_count());

    let stream = async_stream::stream! {
        let _guard = guard;
        while let Some(notification) = rx.recv().await {
            if let Some(event) = to_event(&notification) {
                yield Ok::<Event, Infallible>(event);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fallback;

    #[test]
    fn test_event_names_follow_notification_kind() {
        let data = Notification::Data { data: Arc::new(fallback::payload(Feed::Stocks)), origin: Origin::Fallback };
        assert!(to_event(&data).is_some());
        let error = Notification::Error { message: "backend down".into() };
        assert!(to_event(&error).is_some());
    }

    #[test]
    fn test_stalled_stream_queue_is_bounded() {
        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let forward = event_forwarder(tx);
        for _ in 0..EVENT_BUFFER + 10 {
            forward(&Notification::Error { message: "backend down".into() });
        }

        let mut queued = 0;
        while rx.try_recv().is_ok() {
            queued += 1;
        }
        assert_eq!(queued, EVENT_BUFFER);

        // room again once the client catches up
        forward(&Notification::Error { message: "backend down".into() });
        assert!(rx.try_recv().is_ok());

        drop(rx);
        forward(&Notification::Error { message: "backend down".into() });
    }

    #[test]
    fn test_event_body_shape() {
        let feed = fallback::payload(Feed::Dashboard);
        let body = serde_json::to_value(EventBody::Data { origin: Origin::Live, data: &feed }).unwrap();
        assert_eq!(body["origin"], "live");
        assert_eq!(body["data"]["type"], "dashboard");
        assert_eq!(body["data"]["data"]["production"]["target"], 1000);

        let body = serde_json::to_value(EventBody::Error { message: "x" }).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "x" }));
    }
}
