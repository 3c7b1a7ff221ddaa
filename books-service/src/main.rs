// Books service entrypoint: configuration, logging, store wiring and the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookstore_common::{auth::TokenVerifier, db, server, telemetry};

use books_service::config::BooksConfig;
use books_service::handlers::{app, AppState};
use books_service::repository::{BookRepository, RepositoryFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cfg = match BooksConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    let verifier = TokenVerifier::from_rsa_pem(&cfg.jwt_public_key).context("JWT_PUBLIC_KEY is not a usable RSA public key")?;

    // Fall back to an in-memory store if the database cannot be opened.
    let repo: Arc<dyn BookRepository> = match db::connect(&cfg.database).await {
        Ok(pool) => {
            sqlx::migrate!("./migrations").run(&pool).await.context("creating books schema")?;
            RepositoryFactory::sqlite(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, url = %cfg.database.url, "database not available; starting with in-memory repository");
            RepositoryFactory::in_memory()
        }
    };

    let state = AppState { repo, verifier: Arc::new(verifier) };
    let addr = cfg.server.socket_addr()?;
    server::serve(app(state), addr, &cfg.server.cors_origins).await?;
    Ok(())
}
