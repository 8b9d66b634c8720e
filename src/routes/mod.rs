// HTTP routes: options form, report submission, version, static assets

mod http;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::render::ReportLayout;
use crate::tidepool::TidepoolClient;

/// Read-only per-process state. Each report builds its own document.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) client: Arc<TidepoolClient>,
    pub(crate) layout: Arc<ReportLayout>,
}

pub fn app(client: Arc<TidepoolClient>, config: &AppConfig) -> Router {
    let state = AppState {
        client,
        layout: Arc::new(ReportLayout::from_config(&config.report)),
    };
    Router::new()
        .route("/", get(http::home_handler)) // GET /
        .route("/opts", post(http::report_handler)) // POST /opts
        .route("/version", get(http::version_handler)) // GET /version
        .nest_service("/static", ServeDir::new(&config.server.static_dir)) // GET /static/*
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
