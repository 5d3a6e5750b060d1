//! faultline server
//!
//! Fault- and latency-injecting HTTP endpoint:
//! - `GET /?name=&dep=&sleep=&code=`
//! - `GET /metrics`, `GET /healthz`
//! - Listens on `$PORT`

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use faultline_core::error::{FaultlineError, Result};
use faultline_server::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "faultline-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_env()?;
    let listen = cfg.listen_addr()?;
    tracing::info!(
        version = %cfg.build.version,
        branch = %cfg.build.branch,
        rustversion = faultline_server::RUST_VERSION,
        "build info"
    );

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| FaultlineError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "faultline-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FaultlineError::Internal(format!("server failed: {e}")))?;

    tracing::info!("faultline-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
