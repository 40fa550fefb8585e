use log::debug;
use serde_json::Value;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, PaymentCapture},
    traits::OrderLedgerError,
};

/// Inserts a new order into the database using the given connection. The status column
/// defaults to `Created` and `updated_at` to the insertion time.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderLedgerError> {
    if fetch_order_by_order_id(&order.order_id, conn).await?.is_some() {
        return Err(OrderLedgerError::OrderAlreadyExists(order.order_id));
    }
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                user_id,
                customer_id,
                order_name,
                amount,
                currency,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.user_id)
    .bind(order.customer_id)
    .bind(order.order_name)
    .bind(order.amount)
    .bind(order.currency)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

/// Returns the entry in the orders table for the corresponding `order_id`.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Marks the order as paid, capturing the processor details, in a single conditional
/// statement. Returns `None` when no row changed — either the order does not exist, or it
/// is already `Paid` and must not be touched again.
pub async fn mark_paid(
    order_id: &OrderId,
    capture: &PaymentCapture,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderLedgerError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'Paid',
                payment_key = $2,
                method = $3,
                raw_response = $4,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status <> 'Paid'
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(capture.payment_key.as_deref())
    .bind(capture.method.as_deref())
    .bind(Json(&capture.raw_response))
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Marks the order as failed, storing the error payload. `Paid` orders are excluded by the
/// `WHERE` clause so a late failure can never downgrade a settled payment. Returns `None`
/// when no row changed.
pub async fn mark_failed(
    order_id: &OrderId,
    raw_response: &Value,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderLedgerError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'Failed',
                raw_response = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status <> 'Paid'
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(Json(raw_response))
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Marks the order as cancelled. `payment_key` and `method` are deliberately left alone:
/// a cancellation of a settled payment must keep the capture details on record. Returns
/// `None` when no row changed.
pub async fn mark_cancelled(
    order_id: &OrderId,
    raw_response: &Value,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderLedgerError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'Cancelled',
                raw_response = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status <> 'Cancelled'
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(Json(raw_response))
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
