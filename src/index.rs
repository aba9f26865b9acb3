use std::sync::Arc;

use axum::{Json, debug_handler, extract::State, response::IntoResponse};
use serde_json::json;

use crate::relay::Relay;

#[debug_handler(state = crate::AppState)]
pub async fn health(State(relay): State<Arc<Relay>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "rooms": relay.rooms().len(),
        "connections": relay.dispatcher().connection_count().await,
    }))
}
