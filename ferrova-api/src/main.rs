use std::net::SocketAddr;
use std::sync::Arc;

use ferrova_api::{
    app,
    state::{AppState, AuthConfig},
};
use ferrova_store::{app_config::Config, BookingStore, Database, TrainCatalog};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferrova_api=debug,ferrova_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("starting ferrova api on port {}", config.server.port);

    let db = Database::connect(&config.database.url).await?;
    db.migrate().await?;
    let db = Arc::new(db);

    let state = AppState {
        bookings: Arc::new(BookingStore::new(db.pool.clone())),
        catalog: Arc::new(TrainCatalog::new(db.pool.clone())),
        db,
        auth: AuthConfig {
            secret: config.auth.jwt_secret,
        },
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
