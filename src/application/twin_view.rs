// Twin view adapter - owns resize, redraw scheduling and interaction state
use crate::application::interaction::{cursor_at, Cursor, DocumentClick, Hit, Interaction, Popover, RobotSelection};
use crate::application::renderer::{render, Scene, Surface};
use crate::application::subscribers::{Subscribers, Subscription};
use crate::domain::layout::LayoutGeometry;
use crate::domain::marker::{markers_for, Marker};
use crate::domain::station::StationSnapshot;
use crate::domain::transform::{pointer_to_logical, Point, RenderTransform, Size};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy)]
pub struct TwinViewOptions {
    pub device_pixel_ratio: f64,
    /// Size changes at or below this many pixels on both axes are ignored.
    pub min_resize_delta: f64,
}

impl Default for TwinViewOptions {
    fn default() -> Self {
        Self { device_pixel_ratio: 1.0, min_resize_delta: 5.0 }
    }
}

struct ViewState<S> {
    surface: S,
    container: Size,
    stations: Vec<StationSnapshot>,
    markers: Vec<Marker>,
    transform: Option<RenderTransform>,
    interaction: Interaction,
    redraws: u64,
}

/// Thin adapter around [`render`]: redraws only when the container size,
/// the markers or the selection change.
pub struct TwinView<S> {
    layout: Arc<LayoutGeometry>,
    options: TwinViewOptions,
    state: Arc<Mutex<ViewState<S>>>,
    document: Mutex<Option<Subscription>>,
}

impl<S: Surface + Send + 'static> TwinView<S> {
    pub fn new(layout: Arc<LayoutGeometry>, surface: S, options: TwinViewOptions) -> Self {
        Self {
            layout,
            options,
            state: Arc::new(Mutex::new(ViewState {
                surface,
                container: Size::default(),
                stations: Vec::new(),
                markers: Vec::new(),
                transform: None,
                interaction: Interaction::default(),
                redraws: 0,
            })),
            document: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<S>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn redraw(&self, state: &mut ViewState<S>) -> bool {
        let scene = Scene {
            container: state.container,
            device_pixel_ratio: self.options.device_pixel_ratio,
            layout: &self.layout,
            markers: &state.markers,
            selected: state.interaction.selected(),
        };
        let Some(transform) = render(&mut state.surface, &scene) else {
            return false;
        };
        state.transform = Some(transform);
        state.redraws += 1;
        true
    }

    /// Apply a new container size. Returns whether a redraw happened.
    pub fn resize(&self, size: Size) -> bool {
        let mut state = self.lock();
        let dw = (size.width - state.container.width).abs();
        let dh = (size.height - state.container.height).abs();
        if !state.container.is_empty() && dw <= self.options.min_resize_delta && dh <= self.options.min_resize_delta {
            return false;
        }
        tracing::debug!("Twin container resized to {}x{}", size.width, size.height);
        state.container = size;
        self.redraw(&mut state)
    }

    /// Replace the station list and rebuild markers. Returns whether a
    /// redraw happened.
    pub fn update_stations(&self, stations: &[StationSnapshot]) -> bool {
        let markers = markers_for(stations, &self.layout);
        let mut state = self.lock();
        state.stations = stations.to_vec();
        if markers == state.markers {
            return false;
        }
        state.markers = markers;
        self.redraw(&mut state)
    }

    pub fn click(&self, client: Point, canvas_origin: Point) -> Popover {
        let mut state = self.lock();
        let Some(transform) = state.transform else {
            tracing::debug!("Click before first render ignored");
            return state.interaction.popover().clone();
        };
        let before = state.interaction.selected().map(str::to_string);
        let ViewState { interaction, markers, .. } = &mut *state;
        let hit = interaction.click(client, canvas_origin, &transform, markers, &self.layout);
        if let Some(Hit::Process { name, .. }) = &hit {
            tracing::info!("Opened popover for {}", name);
        }
        if state.interaction.selected() != before.as_deref() {
            self.redraw(&mut state);
        }
        state.interaction.popover().clone()
    }

    pub fn close_popover(&self) -> Popover {
        let mut state = self.lock();
        state.interaction.close();
        state.interaction.popover().clone()
    }

    pub fn select_robot(&self, robot_id: u32) -> Option<RobotSelection> {
        self.lock().interaction.select_robot(robot_id)
    }

    pub fn clear_selection(&self) {
        let mut state = self.lock();
        if state.interaction.selected().is_some() {
            state.interaction.clear_selection();
            self.redraw(&mut state);
        }
    }

    pub fn cursor(&self, client: Point, canvas_origin: Point) -> Cursor {
        let state = self.lock();
        match state.transform {
            Some(t) => cursor_at(pointer_to_logical(client, canvas_origin, &t), &state.markers, &self.layout),
            None => Cursor::Default,
        }
    }

    pub fn popover(&self) -> Popover {
        self.lock().interaction.popover().clone()
    }

    /// Snapshot of the station behind the selected product marker.
    pub fn selected_station(&self) -> Option<StationSnapshot> {
        let state = self.lock();
        let selected = state.interaction.selected()?;
        state.stations.iter().find(|s| s.station_id == selected).cloned()
    }

    pub fn transform(&self) -> Option<RenderTransform> {
        self.lock().transform
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.lock().markers.clone()
    }

    pub fn redraw_count(&self) -> u64 {
        self.lock().redraws
    }

    /// Run `f` against the surface holding the last frame.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().surface)
    }

    /// Listen for document clicks; clicks outside the canvas close the
    /// popover. Replaces any previous attachment.
    pub fn attach_document(&self, bus: &Subscribers<DocumentClick>) {
        let state = Arc::downgrade(&self.state);
        let subscription = bus.subscribe(move |click| {
            if let Some(state) = state.upgrade() {
                state.lock().unwrap_or_else(|e| e.into_inner()).interaction.document_click(*click);
            }
        });
        let previous = self.document.lock().unwrap_or_else(|e| e.into_inner()).replace(subscription);
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    pub fn detach_document(&self) {
        let subscription = self.document.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
    }
}

impl<S> Drop for TwinView<S> {
    fn drop(&mut self) {
        let subscription = self.document.get_mut().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
    }
}

/// Coalesces bursts of resize events into one [`TwinView::resize`] once no
/// new size has arrived for the debounce period.
pub struct ResizeDebouncer {
    tx: mpsc::UnboundedSender<Size>,
    handle: JoinHandle<()>,
}

impl ResizeDebouncer {
    pub fn spawn<S: Surface + Send + 'static>(view: Arc<TwinView<S>>, debounce: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Size>();
        let handle = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(size) => latest = size,
                            None => break,
                        },
                        _ = tokio::time::sleep(debounce) => break,
                    }
                }
                view.resize(latest);
            }
        });
        Self { tx, handle }
    }

    pub fn submit(&self, size: Size) {
        if self.tx.send(size).is_err() {
            tracing::warn!("Resize debouncer has stopped, dropping {:?}", size);
        }
    }
}

impl Drop for ResizeDebouncer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::interaction::ClickTarget;
    use crate::application::renderer::DisplayList;
    use crate::domain::station::StationStatus;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn view() -> Arc<TwinView<DisplayList>> {
        Arc::new(TwinView::new(
            Arc::new(LayoutGeometry::factory()),
            DisplayList::default(),
            TwinViewOptions::default(),
        ))
    }

    fn station(id: &str, progress: f64) -> StationSnapshot {
        StationSnapshot {
            station_id: id.to_string(),
            status: StationStatus::Running,
            efficiency: 0.9,
            temperature: 0.0,
            alert_count: 0,
            metrics: BTreeMap::new(),
            last_update: Utc::now(),
            progress,
            operation: "대기".to_string(),
            cycle_time: 0.0,
            production_count: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_burst_redraws_once_with_doubled_scale() {
        let view = view();
        assert!(view.resize(Size::new(800.0, 600.0)));
        let before = view.transform().unwrap();
        assert_eq!(view.redraw_count(), 1);

        let debouncer = ResizeDebouncer::spawn(view.clone(), Duration::from_millis(150));
        debouncer.submit(Size::new(1000.0, 800.0));
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.submit(Size::new(1400.0, 1000.0));
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.submit(Size::new(1600.0, 1200.0));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(view.redraw_count(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(view.redraw_count(), 2);
        let after = view.transform().unwrap();
        assert_eq!(after.scale, before.scale * 2.0);
        assert_eq!(after.offset_x, before.offset_x * 2.0);
        assert_eq!(after.offset_y, before.offset_y * 2.0);
    }

    #[test]
    fn test_small_resize_ignored() {
        let view = view();
        view.resize(Size::new(800.0, 600.0));
        assert!(!view.resize(Size::new(804.0, 595.0)));
        assert!(view.resize(Size::new(806.0, 600.0)));
        assert_eq!(view.redraw_count(), 2);
    }

    #[test]
    fn test_nothing_drawn_before_size_known() {
        let view = view();
        assert!(!view.update_stations(&[station("A01_DOOR", 10.0)]));
        assert_eq!(view.markers().len(), 1);
        assert_eq!(view.redraw_count(), 0);
        assert!(view.transform().is_none());
        assert_eq!(view.click(Point::new(10.0, 10.0), Point::default()), Popover::Closed);
        assert_eq!(view.cursor(Point::new(10.0, 10.0), Point::default()), Cursor::Default);
    }

    #[test]
    fn test_unchanged_markers_do_not_redraw() {
        let view = view();
        view.resize(Size::new(1000.0, 900.0));
        assert!(view.update_stations(&[station("A01_DOOR", 10.0)]));
        assert!(!view.update_stations(&[station("A01_DOOR", 10.0)]));
        assert!(view.update_stations(&[station("A01_DOOR", 60.0)]));
        assert_eq!(view.redraw_count(), 3);
        assert_eq!(view.markers()[0].color, "#2196F3");
    }

    #[test]
    fn test_selecting_a_marker_exposes_its_station() {
        let view = view();
        view.resize(Size::new(1000.0, 900.0));
        view.update_stations(&[station("C01_FEM", 50.0)]);
        let t = view.transform().unwrap();
        let marker = view.markers()[0].center();

        view.click(t.to_device(marker), Point::default());
        assert_eq!(view.selected_station().map(|s| s.station_id), Some("C01_FEM".to_string()));
        assert_eq!(view.redraw_count(), 3);

        view.clear_selection();
        assert!(view.selected_station().is_none());
    }

    #[test]
    fn test_document_clicks_close_until_detached() {
        let view = view();
        let bus = Subscribers::new();
        view.attach_document(&bus);
        view.resize(Size::new(1000.0, 900.0));
        let t = view.transform().unwrap();
        let label = t.to_device(Point::new(150.0, 100.0));

        assert!(matches!(view.click(label, Point::default()), Popover::Open { .. }));
        bus.notify(&DocumentClick { target: ClickTarget::Canvas });
        assert!(matches!(view.popover(), Popover::Open { .. }));
        bus.notify(&DocumentClick { target: ClickTarget::Elsewhere });
        assert_eq!(view.popover(), Popover::Closed);

        view.detach_document();
        assert!(bus.is_empty());
        view.click(label, Point::default());
        bus.notify(&DocumentClick { target: ClickTarget::Elsewhere });
        assert!(matches!(view.popover(), Popover::Open { .. }));

        view.attach_document(&bus);
        assert_eq!(bus.len(), 1);
        drop(view);
        assert!(bus.is_empty());
    }
}
