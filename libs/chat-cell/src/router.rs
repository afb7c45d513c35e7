// libs/chat-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::catalog::Catalog;
use crate::handlers;

#[derive(Clone)]
pub struct ChatCellState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<Catalog>,
}

pub fn chat_routes(config: Arc<AppConfig>) -> Router {
    // Catalog is static reference data, loaded once per process.
    let state = ChatCellState {
        catalog: Arc::new(Catalog::seed()),
        config,
    };

    Router::new()
        .route("/whatsapp", post(handlers::whatsapp_webhook))
        .with_state(state)
}
