mod error;
mod handlers;
mod models;
mod router;
mod state;

use router::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting spread engine gateway");

    let bind: SocketAddr = std::env::var("CARRY_BIND")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let data_dir =
        PathBuf::from(std::env::var("CARRY_DATA_DIR").unwrap_or_else(|_| "data".to_string()));
    std::fs::create_dir_all(&data_dir)?;

    let orders = Arc::new(order_store::OrderStore::open(
        data_dir.join("orders.journal"),
    )?);
    let state = AppState::new(orders);

    // Optional sweep that expires countered orders the trader never
    // answered. Disabled unless an age is configured.
    if let Ok(hours) = std::env::var("CARRY_EXPIRE_AFTER_HOURS") {
        let max_age = chrono::Duration::hours(hours.parse()?);
        let lifecycle = state.lifecycle.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                ticker.tick().await;
                match lifecycle.expire_stale(chrono::Utc::now() - max_age) {
                    Ok(expired) if !expired.is_empty() => {
                        tracing::info!(count = expired.len(), "expired stale countered orders");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!(%err, "expire sweep failed"),
                }
            }
        });
    }

    let app = create_router(state);
    let listener = TcpListener::bind(bind).await?;

    tracing::info!("Listening on {}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}
