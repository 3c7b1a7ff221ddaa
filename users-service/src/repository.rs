//! User storage. Emails are matched exactly (case-sensitive, as stored).

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bookstore_common::{db, AppError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::RwLock;

use crate::models::{NewUser, User, EMAIL_TAKEN};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn ping(&self) -> bool;
}

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

fn row_to_user(row: &SqliteRow) -> User {
    User { id: row.get("id"), email: row.get("email"), password_hash: row.get("password") }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query(
            r#"INSERT INTO users (email, password)
               VALUES (?1, ?2)
               RETURNING id, email, password"#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(EMAIL_TAKEN.into()),
            _ => AppError::Repo(e.to_string()),
        })?;
        Ok(row_to_user(&row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, email, password FROM users WHERE email = ?1 LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn ping(&self) -> bool { db::ping(&self.pool).await }
}

#[derive(Debug, Default)]
struct InMemoryUsers {
    next_id: i64,
    by_email: BTreeMap<String, User>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: Arc<RwLock<InMemoryUsers>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.inner.write().await;
        if users.by_email.contains_key(&user.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        users.next_id += 1;
        let user = User { id: users.next_id, email: user.email, password_hash: user.password_hash };
        users.by_email.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.inner.read().await;
        Ok(users.by_email.get(email).cloned())
    }

    async fn ping(&self) -> bool { true }
}

#[derive(Debug, Clone)]
pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn sqlite(pool: SqlitePool) -> Arc<dyn UserRepository> { Arc::new(SqliteUserRepository::new(pool)) }
    pub fn in_memory() -> Arc<dyn UserRepository> { Arc::new(InMemoryUserRepository::new()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, hash: &str) -> NewUser {
        NewUser { email: email.into(), password_hash: hash.into() }
    }

    async fn exercise(repo: &dyn UserRepository) {
        let created = repo.create(new_user("a@b.com", "h1")).await.unwrap();
        assert_eq!(repo.find_by_email("a@b.com").await.unwrap(), Some(created.clone()));
        assert_eq!(repo.find_by_email("A@B.COM").await.unwrap(), None);

        let err = repo.create(new_user("a@b.com", "h2")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.find_by_email("a@b.com").await.unwrap().unwrap().password_hash, "h1");

        // Different case is a different account.
        let other = repo.create(new_user("A@b.com", "h3")).await.unwrap();
        assert_ne!(other.id, created.id);
        assert!(repo.ping().await);
    }

    #[tokio::test]
    async fn in_memory_users() {
        exercise(&InMemoryUserRepository::new()).await;
    }

    #[tokio::test]
    async fn sqlite_users() {
        let pool = db::memory().await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        exercise(&SqliteUserRepository::new(pool)).await;
    }
}
