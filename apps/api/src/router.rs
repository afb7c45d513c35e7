use std::sync::Arc;

use axum::{routing::get, Router};

use chat_cell::router::chat_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "WhatsApp booking assistant is running!" }))
        .merge(chat_routes(state))
}
