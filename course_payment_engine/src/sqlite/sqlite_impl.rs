//! `SqliteDatabase` is the concrete SQLite order ledger.
//!
//! All status mutations are single conditional `UPDATE` statements, so two writers racing
//! on the same order id cannot interleave a read-modify-write — the database serializes
//! them, and the losing transition is reported back as a no-op.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders};
use crate::{
    db_types::{NewOrder, Order, OrderId, PaymentCapture},
    traits::{OrderLedger, OrderLedgerError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, OrderLedgerError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding schema migrations.
    pub async fn run_migrations(&self) -> Result<(), OrderLedgerError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| OrderLedgerError::DatabaseError(e.to_string()))?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }
}

impl OrderLedger for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn mark_order_paid(&self, order_id: &OrderId, capture: PaymentCapture) -> Result<Order, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        match orders::mark_paid(order_id, &capture, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order [{order_id}] is now {}", order.status);
                Ok(order)
            },
            None => {
                let existing = orders::fetch_order_by_order_id(order_id, &mut conn)
                    .await?
                    .ok_or_else(|| OrderLedgerError::OrderNotFound(order_id.clone()))?;
                debug!("🗃️ Order [{order_id}] was already {}. Leaving the record untouched.", existing.status);
                Ok(existing)
            },
        }
    }

    async fn mark_order_failed(
        &self,
        order_id: &OrderId,
        raw_response: serde_json::Value,
    ) -> Result<Order, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        match orders::mark_failed(order_id, &raw_response, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order [{order_id}] is now {}", order.status);
                Ok(order)
            },
            None => {
                let existing = orders::fetch_order_by_order_id(order_id, &mut conn)
                    .await?
                    .ok_or_else(|| OrderLedgerError::OrderNotFound(order_id.clone()))?;
                warn!("🗃️ Refusing to mark paid order [{order_id}] as failed.");
                Ok(existing)
            },
        }
    }

    async fn mark_order_cancelled(
        &self,
        order_id: &OrderId,
        raw_response: serde_json::Value,
    ) -> Result<Order, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        match orders::mark_cancelled(order_id, &raw_response, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order [{order_id}] is now {}", order.status);
                Ok(order)
            },
            None => {
                let existing = orders::fetch_order_by_order_id(order_id, &mut conn)
                    .await?
                    .ok_or_else(|| OrderLedgerError::OrderNotFound(order_id.clone()))?;
                debug!("🗃️ Order [{order_id}] was already cancelled.");
                Ok(existing)
            },
        }
    }

    async fn close(&mut self) -> Result<(), OrderLedgerError> {
        self.pool.close().await;
        Ok(())
    }
}
