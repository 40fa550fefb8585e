use chrono::{DateTime, Utc};
use course_payment_engine::db_types::{NewOrderRequest, Order, OrderId};
use cpg_common::Krw;
use serde::{Deserialize, Serialize};
use serde_json::Value;

//-------------------------------------    Order creation     ---------------------------------------------------------
/// The storefront's checkout payload. Everything here is untrusted input; in particular
/// `amount` is advisory and only honoured when no catalog price exists for the slug.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Option<Value>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub course_slug: Option<String>,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
}

impl From<CreateOrderRequest> for NewOrderRequest {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrderRequest {
            user_id: req.user_id,
            course_slug: req.course_slug,
            course_title: req.course_title,
            amount: req.amount.map(Krw::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub ok: bool,
    pub order_id: OrderId,
    pub amount: Krw,
    pub order_name: String,
    pub customer_key: String,
}

impl From<Order> for CreateOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            ok: true,
            order_id: order.order_id,
            amount: order.amount,
            order_name: order.order_name,
            customer_key: order.customer_id,
        }
    }
}

//-------------------------------------  Payment confirmation  --------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub payment_key: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
}

/// What the storefront shows on the success page. `id` is the public order id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_name: String,
    pub amount: Krw,
    pub method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        Self {
            id: order.order_id,
            order_name: order.order_name,
            amount: order.amount,
            method: order.method,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmPaymentResponse {
    pub ok: bool,
    pub order: OrderSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

//-------------------------------------      Admin login       --------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JsonResponse {
    pub fn success() -> Self {
        Self { success: true, message: None }
    }

    pub fn failure<S: std::fmt::Display>(message: S) -> Self {
        Self { success: false, message: Some(message.to_string()) }
    }
}
