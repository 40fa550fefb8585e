use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use cpg_common::{Krw, KRW_CURRENCY_CODE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
pub use sqlx::types::Json;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      OrderStatus      --------------------------------------------------------
/// The payment lifecycle state of an order.
///
/// `Created` is the only non-terminal state. `Paid` can still move to `Cancelled` (a
/// processor-initiated cancellation of a settled payment), but never to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order exists, but no payment has been confirmed for it.
    Created,
    /// The payment processor confirmed the charge in full.
    Paid,
    /// The last confirmation attempt was rejected by the processor or never reached it.
    Failed,
    /// The order was cancelled by the user, an admin, or the processor.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "Created"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Failed => write!(f, "Failed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct OrderStatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = OrderStatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(OrderStatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        OrderId        --------------------------------------------------------
/// The public identifier of an order, e.g. `order_1740830400000_9f3ac1b2`. This is the id
/// shared with the payment widget and the processor, as opposed to the internal row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------         Order         --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: Option<String>,
    pub customer_id: String,
    pub order_name: String,
    pub amount: Krw,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_key: Option<String>,
    pub method: Option<String>,
    /// The last raw processor payload seen for this order, kept verbatim for auditing.
    pub raw_response: Option<Json<Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }
}

//--------------------------------------       NewOrder        --------------------------------------------------------
/// A fully resolved order, ready to be written to the ledger. The amount here is the
/// server-trusted one; it is set exactly once and never changes afterwards.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: Option<String>,
    pub customer_id: String,
    pub order_name: String,
    pub amount: Krw,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(order_id: OrderId, customer_id: String, order_name: String, amount: Krw) -> Self {
        Self {
            order_id,
            user_id: None,
            customer_id,
            order_name,
            amount,
            currency: KRW_CURRENCY_CODE.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

//--------------------------------------    NewOrderRequest    --------------------------------------------------------
/// What the storefront sends when a checkout begins. Everything in here is untrusted;
/// the order flow resolves the authoritative amount and order name from it.
#[derive(Debug, Clone, Default)]
pub struct NewOrderRequest {
    pub user_id: Option<String>,
    pub course_slug: Option<String>,
    pub course_title: Option<String>,
    pub amount: Option<Krw>,
}

//--------------------------------------    PaymentCapture     --------------------------------------------------------
/// The processor-side details captured when an order becomes `Paid`.
#[derive(Debug, Clone)]
pub struct PaymentCapture {
    pub payment_key: Option<String>,
    pub method: Option<String>,
    pub raw_response: Value,
}

//--------------------------------------     PaymentEvent      --------------------------------------------------------
/// A processor-initiated payment state change, as delivered by a (verified) webhook and
/// translated out of the processor's wire format.
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    pub order_id: OrderId,
    pub kind: PaymentEventKind,
    pub payment_key: Option<String>,
    pub method: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventKind {
    Confirmed,
    Failed,
    Cancelled,
}

impl Display for PaymentEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentEventKind::Confirmed => write!(f, "Confirmed"),
            PaymentEventKind::Failed => write!(f, "Failed"),
            PaymentEventKind::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_status_round_trips_through_strings() {
        for status in [OrderStatus::Created, OrderStatus::Paid, OrderStatus::Failed, OrderStatus::Cancelled] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("PAID".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn order_serializes_with_camel_case_keys() {
        let order = Order {
            id: 1,
            order_id: OrderId("order_1740830400000_9f3ac1b2".into()),
            user_id: None,
            customer_id: "guest-1740830400000".into(),
            order_name: "강의 신청".into(),
            amount: Krw::from(500_000),
            currency: KRW_CURRENCY_CODE.into(),
            status: OrderStatus::Created,
            payment_key: None,
            method: None,
            raw_response: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["orderId"], "order_1740830400000_9f3ac1b2");
        assert_eq!(json["orderName"], "강의 신청");
        assert_eq!(json["amount"], 500_000);
        assert_eq!(json["status"], "Created");
        assert!(json["paymentKey"].is_null());
    }
}
