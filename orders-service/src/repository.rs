//! Order storage behind an async trait, with SQLite and in-memory implementations.
//! Column names are `userId` and `bookId`, shared with databases already in service.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bookstore_common::{db, AppError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::RwLock;

use crate::models::{NewOrder, Order, OrderChanges, NOT_FOUND, ORDER_NOT_FOUND};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError>;
    async fn create(&self, order: NewOrder) -> Result<Order, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    /// Apply a partial update. `changes` must not be empty.
    async fn update(&self, id: i64, changes: OrderChanges) -> Result<Order, AppError>;
    async fn ping(&self) -> bool;
}

#[derive(Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

fn row_to_order(row: &SqliteRow) -> Order {
    Order {
        id: row.get("id"),
        user_id: row.get("userId"),
        book_id: row.get("bookId"),
        quantity: row.get("quantity"),
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query(r#"SELECT id, "userId", "bookId", quantity FROM orders WHERE "userId" = ?1 ORDER BY id"#)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_order).collect())
    }

    async fn create(&self, order: NewOrder) -> Result<Order, AppError> {
        let row = sqlx::query(
            r#"INSERT INTO orders ("userId", "bookId", quantity)
               VALUES (?1, ?2, ?3)
               RETURNING id, "userId", "bookId", quantity"#,
        )
        .bind(order.user_id)
        .bind(order.book_id)
        .bind(order.quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row_to_order(&row))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(NOT_FOUND.into()));
        }
        Ok(())
    }

    async fn update(&self, id: i64, changes: OrderChanges) -> Result<Order, AppError> {
        let row = sqlx::query(
            r#"UPDATE orders
               SET "userId" = COALESCE(?2, "userId"),
                   "bookId" = COALESCE(?3, "bookId"),
                   quantity = COALESCE(?4, quantity)
               WHERE id = ?1
               RETURNING id, "userId", "bookId", quantity"#,
        )
        .bind(id)
        .bind(changes.user_id)
        .bind(changes.book_id)
        .bind(changes.quantity)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_order).ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))
    }

    async fn ping(&self) -> bool { db::ping(&self.pool).await }
}

#[derive(Debug, Default)]
struct InMemoryOrders {
    next_id: i64,
    rows: BTreeMap<i64, Order>,
}

#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    inner: Arc<RwLock<InMemoryOrders>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let orders = self.inner.read().await;
        Ok(orders.rows.values().filter(|o| o.user_id == user_id).cloned().collect())
    }

    async fn create(&self, order: NewOrder) -> Result<Order, AppError> {
        let mut orders = self.inner.write().await;
        orders.next_id += 1;
        let order = order.into_order(orders.next_id);
        orders.rows.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut orders = self.inner.write().await;
        orders.rows.remove(&id).ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
        Ok(())
    }

    async fn update(&self, id: i64, changes: OrderChanges) -> Result<Order, AppError> {
        let mut orders = self.inner.write().await;
        let order = orders.rows.get_mut(&id).ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;
        changes.apply(order);
        Ok(order.clone())
    }

    async fn ping(&self) -> bool { true }
}

#[derive(Debug, Clone)]
pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn sqlite(pool: SqlitePool) -> Arc<dyn OrderRepository> { Arc::new(SqliteOrderRepository::new(pool)) }
    pub fn in_memory() -> Arc<dyn OrderRepository> { Arc::new(InMemoryOrderRepository::new()) }
}
