use chrono::{TimeZone, Utc};
use course_payment_engine::{
    db_types::{Json, NewOrder, Order, OrderId, OrderStatus, PaymentCapture},
    traits::{OrderLedger, OrderLedgerError, PaymentProcessor, ProcessorError, ProcessorPayment},
};
use cpg_common::Krw;
use mockall::mock;
use serde_json::json;

mock! {
    pub OrderLedger {}
    impl OrderLedger for OrderLedger {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderLedgerError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderLedgerError>;
        async fn mark_order_paid(&self, order_id: &OrderId, capture: PaymentCapture) -> Result<Order, OrderLedgerError>;
        async fn mark_order_failed(&self, order_id: &OrderId, raw_response: serde_json::Value) -> Result<Order, OrderLedgerError>;
        async fn mark_order_cancelled(&self, order_id: &OrderId, raw_response: serde_json::Value) -> Result<Order, OrderLedgerError>;
        async fn close(&mut self) -> Result<(), OrderLedgerError>;
    }
}

mock! {
    pub Processor {}
    impl PaymentProcessor for Processor {
        async fn confirm_payment(&self, payment_key: &str, order_id: &OrderId, amount: Krw) -> Result<ProcessorPayment, ProcessorError>;
    }
}

pub const TEST_ORDER_ID: &str = "order_1740830400000_9f3ac1b2";

/// The order a ledger would return after inserting `new_order`.
pub fn order_from_new(new_order: NewOrder) -> Order {
    Order {
        id: 1,
        order_id: new_order.order_id,
        user_id: new_order.user_id,
        customer_id: new_order.customer_id,
        order_name: new_order.order_name,
        amount: new_order.amount,
        currency: new_order.currency,
        status: OrderStatus::Created,
        payment_key: None,
        method: None,
        raw_response: None,
        created_at: new_order.created_at,
        updated_at: new_order.created_at,
    }
}

pub fn created_order(amount: i64) -> Order {
    let timestamp = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    Order {
        id: 1,
        order_id: OrderId(TEST_ORDER_ID.into()),
        user_id: None,
        customer_id: "guest-1740830400000".into(),
        order_name: "AI 마케팅 실무".into(),
        amount: Krw::from(amount),
        currency: "KRW".into(),
        status: OrderStatus::Created,
        payment_key: None,
        method: None,
        raw_response: None,
        created_at: timestamp,
        updated_at: timestamp,
    }
}

pub fn paid_order(amount: i64) -> Order {
    Order {
        status: OrderStatus::Paid,
        payment_key: Some("tosskey_1".into()),
        method: Some("카드".into()),
        raw_response: Some(Json(json!({ "status": "DONE" }))),
        ..created_order(amount)
    }
}

pub fn stub_payment(payment_key: &str) -> ProcessorPayment {
    ProcessorPayment {
        payment_key: payment_key.to_string(),
        method: Some("카드".to_string()),
        raw: json!({ "paymentKey": payment_key, "status": "DONE" }),
    }
}
