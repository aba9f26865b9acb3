use roomrelay::{AppState, Config};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_json);

    let addr = config.bind_addr();
    let rooms = config.rooms.join(", ");
    let app = roomrelay::router(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("roomrelay listening on {addr}, rooms: {rooms}");
    axum::serve(listener, app).await?;
    Ok(())
}
