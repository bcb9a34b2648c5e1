use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| {
        info!("PORT not set, using default: 3000");
        "3000".to_string()
    });
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, mock_server::app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await
        }
    }
}
