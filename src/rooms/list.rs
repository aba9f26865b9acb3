use std::sync::Arc;

use axum::{
    Json, debug_handler,
    extract::{Path, State},
};

use crate::{AppResult, relay::Relay};

use super::Message;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn rooms(State(relay): State<Arc<Relay>>) -> Json<Vec<String>> {
    Json(relay.rooms().names().to_vec())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn history(
    State(relay): State<Arc<Relay>>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    let room = relay.rooms().room(&name)?;
    let history = room.lock().await.history().to_vec();
    Ok(Json(history))
}
