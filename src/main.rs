use lifestyle_coach::{resolve_data_path, router, AppState, Store};
use std::{env, net::SocketAddr};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    if let Some(parent) = data_path.parent() {
        if !parent.as_os_str().is_empty() {
            // Unusable storage degrades to in-memory operation, it never
            // stops the server from coming up.
            if let Err(err) = fs::create_dir_all(parent).await {
                warn!("failed to create data directory: {err}");
            }
        }
    }

    let store = Store::load(data_path).await;
    let state = AppState::new(store, env::var("GEMINI_API_KEY").ok());
    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
