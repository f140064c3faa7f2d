// Application state for HTTP handlers
use crate::application::interaction::DocumentClick;
use crate::application::polling_service::{Feed, FeedData, Notification, Origin, PollingService};
use crate::application::subscribers::{Subscribers, Subscription};
use crate::application::twin_view::{ResizeDebouncer, TwinView};
use crate::infrastructure::svg_surface::SvgSurface;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Latest payload of every feed as last notified, live or fallback.
#[derive(Default)]
pub struct FeedStore {
    latest: RwLock<HashMap<Feed, (Arc<FeedData>, Origin)>>,
}

impl FeedStore {
    pub fn record(&self, notification: &Notification) {
        if let Notification::Data { data, origin } = notification {
            let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
            latest.insert(data.feed(), (data.clone(), *origin));
        }
    }

    pub fn get(&self, feed: Feed) -> Option<(Arc<FeedData>, Origin)> {
        self.latest.read().unwrap_or_else(|e| e.into_inner()).get(&feed).cloned()
    }
}

pub struct AppState {
    pub polling: PollingService,
    pub feeds: Arc<FeedStore>,
    pub twin: Arc<TwinView<SvgSurface>>,
    pub resize: ResizeDebouncer,
    pub document_clicks: Subscribers<DocumentClick>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl AppState {
    /// Wire the polling service to the feed store and the twin view.
    /// Must be called inside a tokio runtime.
    pub fn new(polling: PollingService, twin: Arc<TwinView<SvgSurface>>, debounce: Duration) -> Self {
        let feeds = Arc::new(FeedStore::default());
        let document_clicks = Subscribers::new();
        twin.attach_document(&document_clicks);

        let store = feeds.clone();
        let record = polling.subscribe(move |notification| store.record(notification));

        let view = twin.clone();
        let redraw = polling.subscribe(move |notification| {
            if let Notification::Data { data, .. } = notification {
                if let FeedData::Twin(stations) = &**data {
                    view.update_stations(stations);
                }
            }
        });

        Self {
            resize: ResizeDebouncer::spawn(twin.clone(), debounce),
            polling,
            feeds,
            twin,
            document_clicks,
            subscriptions: Mutex::new(vec![record, redraw]),
        }
    }

    /// Stop polling and release every listener this state registered.
    pub fn shutdown(&self) {
        self.polling.stop_polling();
        let subscriptions: Vec<Subscription> =
            self.subscriptions.lock().unwrap_or_else(|e| e.into_inner()).drain(..).collect();
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        self.twin.detach_document();
    }
}
