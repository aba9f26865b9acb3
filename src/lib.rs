pub mod appresult;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod protocol;
pub mod relay;
pub mod res;
pub mod rooms;
pub mod session;

use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::get};
use tower_http::cors::CorsLayer;

pub use appresult::{AppError, AppResult};
pub use config::Config;
pub use error::{RelayError, RelayResult};
pub use relay::Relay;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            relay: Arc::new(Relay::new(&config)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(res::client))
        .route("/health", get(index::health))
        .merge(rooms::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
}
