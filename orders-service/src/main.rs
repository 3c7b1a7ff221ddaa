// Orders service entrypoint: configuration, logging, store and books-service wiring, HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookstore_common::{auth::TokenVerifier, db, server, telemetry};

use orders_service::books::HttpBookDirectory;
use orders_service::config::OrdersConfig;
use orders_service::handlers::{app, AppState};
use orders_service::repository::{OrderRepository, RepositoryFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cfg = match OrdersConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    let verifier = TokenVerifier::from_rsa_pem(&cfg.jwt_public_key).context("JWT_PUBLIC_KEY is not a usable RSA public key")?;
    let books = HttpBookDirectory::new(cfg.books.url.clone(), cfg.books.timeout).context("building books service client")?;
    tracing::info!(books_url = %cfg.books.url, timeout_ms = cfg.books.timeout.as_millis() as u64, "book existence checks enabled");

    let repo: Arc<dyn OrderRepository> = match db::connect(&cfg.database).await {
        Ok(pool) => {
            sqlx::migrate!("./migrations").run(&pool).await.context("creating orders schema")?;
            RepositoryFactory::sqlite(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, url = %cfg.database.url, "database not available; starting with in-memory repository");
            RepositoryFactory::in_memory()
        }
    };

    let state = AppState { repo, books: Arc::new(books), verifier: Arc::new(verifier) };
    let addr = cfg.server.socket_addr()?;
    server::serve(app(state), addr, &cfg.server.cors_origins).await?;
    Ok(())
}
