use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId, PaymentCapture};

/// Storage behaviour required of an order ledger backend.
///
/// Status mutations must be atomic per order: a backend may never let two concurrent
/// writers interleave a read-modify-write on the same order id. The SQLite backend meets
/// this with single conditional `UPDATE` statements; other backends must provide an
/// equivalent guarantee.
#[allow(async_fn_in_trait)]
pub trait OrderLedger {
    /// The URL of the backing store.
    fn url(&self) -> &str;

    /// Stores a freshly created order with `Created` status.
    ///
    /// Fails with [`OrderLedgerError::OrderAlreadyExists`] if the order id is taken.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderLedgerError>;

    /// Returns the order with the given public order id, if any.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderLedgerError>;

    /// Transitions the order to `Paid` and captures the processor details.
    ///
    /// If the order is already `Paid`, the existing record is returned untouched —
    /// `payment_key` and `method` are immutable once set by a successful confirmation.
    async fn mark_order_paid(&self, order_id: &OrderId, capture: PaymentCapture) -> Result<Order, OrderLedgerError>;

    /// Transitions the order to `Failed`, storing the error payload for the audit trail.
    ///
    /// A `Paid` order is never downgraded; in that case the paid record is returned as-is.
    async fn mark_order_failed(
        &self,
        order_id: &OrderId,
        raw_response: serde_json::Value,
    ) -> Result<Order, OrderLedgerError>;

    /// Transitions the order to `Cancelled`, storing the processor payload.
    ///
    /// Cancellation is accepted from any state (including `Paid`, for processor-initiated
    /// cancellations) and leaves `payment_key` and `method` untouched.
    async fn mark_order_cancelled(
        &self,
        order_id: &OrderId,
        raw_response: serde_json::Value,
    ) -> Result<Order, OrderLedgerError>;

    /// Closes the backing store.
    async fn close(&mut self) -> Result<(), OrderLedgerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderLedgerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for OrderLedgerError {
    fn from(e: sqlx::Error) -> Self {
        OrderLedgerError::DatabaseError(e.to_string())
    }
}
