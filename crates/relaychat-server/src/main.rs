//! relaychat server
//!
//! - WebSocket endpoint: /v1/ws
//! - Tracing span per session
//! - Heartbeat ping + idle timeout

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use relaychat_server::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "relaychat-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load_default()?;
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|e| format!("server.listen must be a valid SocketAddr: {e}"))?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "relaychat-server starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
