mod list;
mod msg;
mod presence;
mod room;
mod store;
mod ws;

use axum::{Router, routing::get};

use crate::AppState;

pub use msg::{Message, Reaction, Reactions};
pub use presence::Presence;
pub use room::Room;
pub use store::RoomStore;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::room_ws))
        .route("/rooms", get(list::rooms))
        .route("/rooms/{name}/history", get(list::history))
}
