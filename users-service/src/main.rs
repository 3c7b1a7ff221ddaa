// Users service entrypoint: configuration, logging, store and signing-key wiring, HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookstore_common::{auth::TokenIssuer, db, server, telemetry};

use users_service::auth::{Argon2AuthService, AuthService};
use users_service::config::UsersConfig;
use users_service::handlers::{app, AppState};
use users_service::repository::{RepositoryFactory, UserRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cfg = match UsersConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    let issuer = TokenIssuer::from_rsa_pem(&cfg.jwt_private_key).context("JWT_PRIVATE_KEY is not a usable RSA private key")?;

    let repo: Arc<dyn UserRepository> = match db::connect(&cfg.database).await {
        Ok(pool) => {
            sqlx::migrate!("./migrations").run(&pool).await.context("creating users schema")?;
            RepositoryFactory::sqlite(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, url = %cfg.database.url, "database not available; starting with in-memory repository");
            RepositoryFactory::in_memory()
        }
    };

    let auth = Arc::new(Argon2AuthService::new(issuer)) as Arc<dyn AuthService>;
    let state = AppState { repo, auth };
    let addr = cfg.server.socket_addr()?;
    server::serve(app(state), addr, &cfg.server.cors_origins).await?;
    Ok(())
}
