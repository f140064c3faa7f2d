// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::polling_service::PollingService;
use crate::application::twin_view::TwinView;
use crate::domain::layout::{factory_lines, LayoutGeometry};
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_client::HttpFactoryApi;
use crate::infrastructure::svg_surface::SvgSurface;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    clear_product, click_twin, close_popover, dashboard, events, health_check, hover_twin, inventory,
    outside_click, resize_twin, select_robot, selected_product, station, twin_state, twin_svg,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config().context("Failed to load config/dashboard.toml")?;

    // Static factory geometry (domain layer)
    let layout = Arc::new(LayoutGeometry::new(factory_lines())?);

    // Backend client (infrastructure layer)
    let api = Arc::new(HttpFactoryApi::new(
        config.api.base_url.clone(),
        std::time::Duration::from_millis(config.api.timeout_ms),
    ));

    // Services (application layer)
    let polling = PollingService::new(api, config.polling_options());
    let twin = Arc::new(TwinView::new(layout, SvgSurface::new(), config.twin_options()));

    // Application state wires notifications into the feed store and the twin
    let state = Arc::new(AppState::new(polling.clone(), twin, config.debounce()));
    polling.start_polling(config.poll_interval());

    // Build router (presentation layer)
    // SVG frames are compressed in the response builder, so no CompressionLayer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(dashboard))
        .route("/inventory", get(inventory))
        .route("/stations/:id", get(station))
        .route("/twin.svg", get(twin_svg))
        .route("/twin/state", get(twin_state))
        .route("/twin/size", put(resize_twin))
        .route("/twin/click", post(click_twin))
        .route("/twin/hover", post(hover_twin))
        .route("/twin/outside-click", post(outside_click))
        .route("/twin/popover/close", post(close_popover))
        .route("/twin/popover/robot", post(select_robot))
        .route("/twin/product", get(selected_product).delete(clear_product))
        .route("/events", get(events))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting factory-twin-dashboard on {}, backend {}", addr, config.api.base_url);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl-C, then stop polling and drop every listener so open
/// event streams end.
async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    state.shutdown();
    state.polling.dispose();
}
