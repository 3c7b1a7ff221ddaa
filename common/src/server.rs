//! HTTP bootstrap shared by the service binaries: outer middleware stack, listener and
//! graceful shutdown on Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use axum::{http::HeaderValue, Router};
use tower_http::{cors::{AllowOrigin, Any, CorsLayer}, compression::CompressionLayer, trace::TraceLayer};

pub fn with_http_layers(router: Router, cors_origins: &[HeaderValue]) -> Router {
    let router = router.layer(CompressionLayer::new()).layer(TraceLayer::new_for_http());
    if cors_origins.is_empty() {
        router
    } else {
        router.layer(cors_layer(cors_origins))
    }
}

pub async fn serve(router: Router, addr: SocketAddr, cors_origins: &[HeaderValue]) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(cors_origins = cors_origins.len(), "listening on {}", addr);
    axum::serve(listener, with_http_layers(router, cors_origins))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    tracing::info!("shutdown signal received");
}
