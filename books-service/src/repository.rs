//! Book storage behind an async trait, with a SQLite implementation and an in-memory one
//! used by tests and as a fallback when the database cannot be opened.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bookstore_common::{db, AppError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::RwLock;

use crate::models::{Book, NewBook, BOOK_NOT_FOUND, NOT_FOUND};

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Book, AppError>;
    async fn create(&self, book: NewBook) -> Result<Book, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    async fn ping(&self) -> bool;
}

#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

fn row_to_book(row: &SqliteRow) -> Book {
    Book {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        year: row.get("year"),
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list(&self) -> Result<Vec<Book>, AppError> {
        let rows = sqlx::query("SELECT id, title, author, year FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_book).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, AppError> {
        let row = sqlx::query("SELECT id, title, author, year FROM books WHERE id = ?1 LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_book).ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.into()))
    }

    async fn create(&self, book: NewBook) -> Result<Book, AppError> {
        let row = sqlx::query(
            r#"INSERT INTO books (title, author, year)
               VALUES (?1, ?2, ?3)
               RETURNING id, title, author, year"#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await?;
        Ok(row_to_book(&row))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(NOT_FOUND.into()));
        }
        Ok(())
    }

    async fn ping(&self) -> bool { db::ping(&self.pool).await }
}

#[derive(Debug, Default)]
struct InMemoryBooks {
    next_id: i64,
    rows: BTreeMap<i64, Book>,
}

#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    inner: Arc<RwLock<InMemoryBooks>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list(&self) -> Result<Vec<Book>, AppError> {
        let books = self.inner.read().await;
        Ok(books.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, AppError> {
        let books = self.inner.read().await;
        books.rows.get(&id).cloned().ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.into()))
    }

    async fn create(&self, book: NewBook) -> Result<Book, AppError> {
        let mut books = self.inner.write().await;
        books.next_id += 1;
        let book = book.into_book(books.next_id);
        books.rows.insert(book.id, book.clone());
        Ok(book)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut books = self.inner.write().await;
        books.rows.remove(&id).ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
        Ok(())
    }

    async fn ping(&self) -> bool { true }
}

/// Picks a repository implementation; SQLite when a pool is available.
#[derive(Debug, Clone)]
pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn sqlite(pool: SqlitePool) -> Arc<dyn BookRepository> { Arc::new(SqliteBookRepository::new(pool)) }
    pub fn in_memory() -> Arc<dyn BookRepository> { Arc::new(InMemoryBookRepository::new()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> NewBook {
        NewBook { title: "Dune".into(), author: "Frank Herbert".into(), year: 1965 }
    }

    async fn exercise(repo: &dyn BookRepository) {
        assert!(repo.list().await.unwrap().is_empty());
        let created = repo.create(dune()).await.unwrap();
        assert_eq!(created.title, "Dune");
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), created);
        assert_eq!(repo.list().await.unwrap(), vec![created.clone()]);

        repo.delete(created.id).await.unwrap();
        assert!(matches!(repo.find_by_id(created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.delete(created.id).await, Err(AppError::NotFound(_))));
        assert!(repo.ping().await);
    }

    #[tokio::test]
    async fn in_memory_crud() {
        exercise(&InMemoryBookRepository::new()).await;
    }

    #[tokio::test]
    async fn sqlite_crud() {
        let pool = db::memory().await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        exercise(&SqliteBookRepository::new(pool)).await;
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let repo = InMemoryBookRepository::new();
        let first = repo.create(dune()).await.unwrap();
        repo.delete(first.id).await.unwrap();
        let second = repo.create(dune()).await.unwrap();
        assert!(second.id > first.id);
    }
}
