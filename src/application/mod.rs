// Application layer - polling, rendering and interaction use cases
pub mod factory_api;
pub mod interaction;
pub mod polling_service;
pub mod renderer;
pub mod subscribers;
pub mod ticker;
pub mod twin_view;
pub mod view_models;
