// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod fallback;
pub mod http_client;
pub mod http_response;
pub mod svg_surface;
