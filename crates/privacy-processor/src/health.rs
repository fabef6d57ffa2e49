use axum::{http::StatusCode, routing::get, Router};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serves the liveness check: `GET /` answers 200 with no body for as long
/// as the instance is up. There is no payload contract.
pub async fn serve_health(port: u16, ctx: CancellationToken) -> anyhow::Result<()> {
    let app = Router::new().route("/", get(|| async { StatusCode::OK }));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port = port, "listening for health checks");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { ctx.cancelled().await })
        .await?;

    Ok(())
}
