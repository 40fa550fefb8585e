//! Order lifecycle tests against a real SQLite ledger.
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};

use course_payment_engine::{
    catalog::CourseCatalog,
    db_types::{NewOrderRequest, OrderId, OrderStatus, PaymentEvent, PaymentEventKind},
    traits::{OrderLedger, PaymentProcessor, ProcessorError, ProcessorPayment},
    ConfirmationResult,
    OrderFlowApi,
    OrderFlowError,
    SqliteDatabase,
};
use cpg_common::Krw;
use serde_json::json;
use support::{prepare_test_env, random_db_path};

enum StubOutcome {
    Approve,
    Decline,
}

/// A processor stand-in that records how often it was called.
struct StubProcessor {
    calls: AtomicUsize,
    outcome: StubOutcome,
}

impl StubProcessor {
    fn approving() -> Self {
        Self { calls: AtomicUsize::new(0), outcome: StubOutcome::Approve }
    }

    fn declining() -> Self {
        Self { calls: AtomicUsize::new(0), outcome: StubOutcome::Decline }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentProcessor for StubProcessor {
    async fn confirm_payment(
        &self,
        payment_key: &str,
        order_id: &OrderId,
        amount: Krw,
    ) -> Result<ProcessorPayment, ProcessorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            StubOutcome::Approve => Ok(ProcessorPayment {
                payment_key: payment_key.to_string(),
                method: Some("카드".to_string()),
                raw: json!({
                    "paymentKey": payment_key,
                    "orderId": order_id.as_str(),
                    "totalAmount": amount.value(),
                    "status": "DONE",
                }),
            }),
            StubOutcome::Decline => Err(ProcessorError::Declined {
                message: "한도초과 혹은 잔액부족으로 결제에 실패했습니다.".to_string(),
                raw: json!({ "code": "REJECT_CARD_PAYMENT", "orderId": order_id.as_str() }),
            }),
        }
    }
}

fn flow_api(db: SqliteDatabase) -> OrderFlowApi<SqliteDatabase> {
    OrderFlowApi::new(db, CourseCatalog::bundled())
}

fn checkout_request(amount: i64, title: &str) -> NewOrderRequest {
    NewOrderRequest {
        amount: Some(Krw::from(amount)),
        course_title: Some(title.to_string()),
        ..NewOrderRequest::default()
    }
}

#[tokio::test]
async fn create_order_stores_a_created_order() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db.clone());

    let order = api.create_order(checkout_request(500_000, "AI 마케팅 실무")).await.unwrap();
    assert!(order.order_id.as_str().starts_with("order_"));
    assert_eq!(order.status, OrderStatus::Created);
    assert_eq!(order.amount, Krw::from(500_000));
    assert_eq!(order.order_name, "AI 마케팅 실무");
    assert_eq!(order.currency, "KRW");
    assert!(order.customer_id.starts_with("guest-"));
    assert!(order.payment_key.is_none());
    assert!(order.method.is_none());

    let stored = db.fetch_order_by_order_id(&order.order_id).await.unwrap().expect("order must be persisted");
    assert_eq!(stored.amount, order.amount);
    assert_eq!(stored.status, OrderStatus::Created);
}

#[tokio::test]
async fn create_order_keeps_the_supplied_user_id() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db);

    let mut req = checkout_request(200_000, "AI 취업 특강");
    req.user_id = Some("user-8731".to_string());
    let order = api.create_order(req).await.unwrap();
    assert_eq!(order.user_id.as_deref(), Some("user-8731"));
    assert_eq!(order.customer_id, "user-8731");
}

#[tokio::test]
async fn create_order_rejects_non_positive_amounts() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db);

    for amount in [0, -5_000] {
        let err = api.create_order(checkout_request(amount, "AI 마케팅 실무")).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidAmount));
    }
    let err = api.create_order(NewOrderRequest::default()).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidAmount));
}

#[tokio::test]
async fn catalog_price_overrides_the_client_amount() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db);

    let req = NewOrderRequest {
        course_slug: Some("marketing-ai".to_string()),
        amount: Some(Krw::from(1_000)),
        ..NewOrderRequest::default()
    };
    let order = api.create_order(req).await.unwrap();
    assert_eq!(order.amount, Krw::from(550_000));
    assert_eq!(order.order_name, "AI 마케팅 실무");
}

#[tokio::test]
async fn confirmation_scenario_with_idempotent_retry() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db.clone());
    let processor = StubProcessor::approving();

    let order = api.create_order(checkout_request(500_000, "AI 마케팅 실무")).await.unwrap();

    // Tampered amount: rejected, order untouched, processor never called.
    let err = api.confirm_order(&processor, "tosskey_1", &order.order_id, Krw::from(400_000)).await.unwrap_err();
    assert_eq!(err.to_string(), "결제 금액이 일치하지 않습니다.");
    assert_eq!(processor.call_count(), 0);
    let stored = db.fetch_order_by_order_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Created);

    // Matching amount: settled.
    let result = api.confirm_order(&processor, "tosskey_1", &order.order_id, Krw::from(500_000)).await.unwrap();
    assert!(matches!(result, ConfirmationResult::Confirmed(_)));
    let paid = result.into_order();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.payment_key.as_deref(), Some("tosskey_1"));
    assert_eq!(paid.method.as_deref(), Some("카드"));
    assert!(paid.raw_response.is_some());

    // Client retry after a timeout: success without a second processor call.
    let retry = api.confirm_order(&processor, "tosskey_1", &order.order_id, Krw::from(500_000)).await.unwrap();
    assert!(retry.was_already_paid());
    assert_eq!(processor.call_count(), 1);
}

#[tokio::test]
async fn unknown_orders_cannot_be_confirmed() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db);
    let processor = StubProcessor::approving();

    let missing = OrderId("order_0_ffffffff".to_string());
    let err = api.confirm_order(&processor, "tosskey_1", &missing, Krw::from(10_000)).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderNotFound(_)));
    assert_eq!(processor.call_count(), 0);
}

#[tokio::test]
async fn declined_confirmation_marks_the_order_failed() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db.clone());
    let processor = StubProcessor::declining();

    let order = api.create_order(checkout_request(450_000, "AI 영업 실무")).await.unwrap();
    let err = api.confirm_order(&processor, "tosskey_9", &order.order_id, Krw::from(450_000)).await.unwrap_err();
    assert_eq!(err.to_string(), "한도초과 혹은 잔액부족으로 결제에 실패했습니다.");

    let stored = db.fetch_order_by_order_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Failed);
    let raw = stored.raw_response.expect("the decline payload must be kept for auditing");
    assert_eq!(raw.0["code"], "REJECT_CARD_PAYMENT");

    // The processor can still settle the order out-of-band afterwards.
    let event = PaymentEvent {
        order_id: order.order_id.clone(),
        kind: PaymentEventKind::Confirmed,
        payment_key: Some("tosskey_9".to_string()),
        method: Some("가상계좌".to_string()),
        raw: json!({ "orderId": order.order_id.as_str(), "paymentKey": "tosskey_9" }),
    };
    let updated = api.apply_payment_event(event).await.unwrap().expect("order exists");
    assert_eq!(updated.status, OrderStatus::Paid);
    assert_eq!(updated.method.as_deref(), Some("가상계좌"));
}

#[tokio::test]
async fn failed_events_never_downgrade_a_paid_order() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db.clone());
    let processor = StubProcessor::approving();

    let order = api.create_order(checkout_request(600_000, "AI 개발 실무")).await.unwrap();
    api.confirm_order(&processor, "tosskey_2", &order.order_id, Krw::from(600_000)).await.unwrap();

    let event = PaymentEvent {
        order_id: order.order_id.clone(),
        kind: PaymentEventKind::Failed,
        payment_key: None,
        method: None,
        raw: json!({ "orderId": order.order_id.as_str(), "code": "LATE_FAILURE" }),
    };
    let after = api.apply_payment_event(event).await.unwrap().unwrap();
    assert_eq!(after.status, OrderStatus::Paid);
    assert_eq!(after.payment_key.as_deref(), Some("tosskey_2"));
}

#[tokio::test]
async fn cancellation_keeps_the_capture_details() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db.clone());
    let processor = StubProcessor::approving();

    let order = api.create_order(checkout_request(400_000, "공기업 사기업 취업특강")).await.unwrap();
    api.confirm_order(&processor, "tosskey_3", &order.order_id, Krw::from(400_000)).await.unwrap();

    let event = PaymentEvent {
        order_id: order.order_id.clone(),
        kind: PaymentEventKind::Cancelled,
        payment_key: None,
        method: None,
        raw: json!({ "orderId": order.order_id.as_str(), "cancelReason": "고객 요청" }),
    };
    let cancelled = api.apply_payment_event(event).await.unwrap().unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.payment_key.as_deref(), Some("tosskey_3"));
    assert_eq!(cancelled.method.as_deref(), Some("카드"));
}

#[tokio::test]
async fn events_for_unknown_orders_are_acknowledged_without_changes() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = flow_api(db);

    let event = PaymentEvent {
        order_id: OrderId("order_0_00000000".to_string()),
        kind: PaymentEventKind::Confirmed,
        payment_key: Some("tosskey_x".to_string()),
        method: None,
        raw: json!({}),
    };
    assert!(api.apply_payment_event(event).await.unwrap().is_none());
}
