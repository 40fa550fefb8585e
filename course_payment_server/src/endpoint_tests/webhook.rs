use actix_web::{http::StatusCode, web, web::ServiceConfig};
use course_payment_engine::{catalog::CourseCatalog, db_types::OrderStatus, OrderFlowApi};
use cpg_common::Secret;
use serde_json::json;
use toss_tools::helpers::webhook_signature;

use super::{
    helpers::{json_body, post_raw},
    mocks::{created_order, paid_order, MockOrderLedger, TEST_ORDER_ID},
};
use crate::{
    middleware::{HmacMiddlewareFactory, WEBHOOK_SIGNATURE_HEADER},
    webhook_routes::toss_webhook,
};

const WEBHOOK_SECRET: &str = "webhook-secret-for-tests";

fn configure_webhook(ledger: MockOrderLedger, verify: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(ledger, CourseCatalog::default());
        let guard =
            HmacMiddlewareFactory::new(WEBHOOK_SIGNATURE_HEADER, Secret::new(WEBHOOK_SECRET.to_string()), verify);
        cfg.app_data(web::Data::new(api))
            .service(web::resource("/webhook").wrap(guard).route(web::post().to(toss_webhook::<MockOrderLedger>)));
    }
}

fn confirmed_event_body() -> Vec<u8> {
    json!({
        "eventType": "PAYMENT_CONFIRMED",
        "createdAt": "2025-03-01T12:00:00",
        "data": { "orderId": TEST_ORDER_ID, "paymentKey": "tosskey_1", "method": "카드" }
    })
    .to_string()
    .into_bytes()
}

fn signed(body: &[u8]) -> Vec<(&'static str, String)> {
    vec![(WEBHOOK_SIGNATURE_HEADER, webhook_signature(WEBHOOK_SECRET, body))]
}

#[actix_web::test]
async fn webhook_rejects_an_invalid_signature_without_touching_any_order() {
    let _ = env_logger::try_init().ok();
    // No expectations at all: a single ledger call fails the test.
    let ledger = MockOrderLedger::new();

    let body = confirmed_event_body();
    let headers = vec![(WEBHOOK_SIGNATURE_HEADER, "Zm9yZ2VkLXNpZ25hdHVyZQ==".to_string())];
    let (status, body) = post_raw("/webhook", body, headers, configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let res = json_body(&body);
    assert_eq!(res["ok"], false);
    assert_eq!(res["error"], "Invalid signature");
}

#[actix_web::test]
async fn webhook_rejects_a_missing_signature() {
    let _ = env_logger::try_init().ok();
    let ledger = MockOrderLedger::new();

    let body = confirmed_event_body();
    let (status, _) = post_raw("/webhook", body, vec![], configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn webhook_applies_a_verified_confirmation() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(created_order(500_000))));
    ledger
        .expect_mark_order_paid()
        .times(1)
        .withf(|_, capture| capture.payment_key.as_deref() == Some("tosskey_1"))
        .returning(|_, _| Ok(paid_order(500_000)));

    let body = confirmed_event_body();
    let headers = signed(&body);
    let (status, body) = post_raw("/webhook", body, headers, configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["ok"], true);
}

#[actix_web::test]
async fn webhook_acknowledges_unknown_orders_without_mutation() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(None));

    let body = confirmed_event_body();
    let headers = signed(&body);
    let (status, body) = post_raw("/webhook", body, headers, configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["ok"], true);
}

#[actix_web::test]
async fn webhook_ignores_unknown_event_types() {
    let _ = env_logger::try_init().ok();
    // Unknown events are acknowledged without even looking at the ledger.
    let ledger = MockOrderLedger::new();

    let body = json!({ "eventType": "DEPOSIT_CALLBACK", "data": { "orderId": TEST_ORDER_ID } })
        .to_string()
        .into_bytes();
    let headers = signed(&body);
    let (status, body) = post_raw("/webhook", body, headers, configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["ok"], true);
}

#[actix_web::test]
async fn webhook_marks_failures_and_keeps_paid_orders_intact() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(paid_order(500_000))));
    // The ledger refuses the downgrade and returns the paid record.
    ledger.expect_mark_order_failed().times(1).returning(|_, _| Ok(paid_order(500_000)));

    let body = json!({ "eventType": "PAYMENT_FAILED", "data": { "orderId": TEST_ORDER_ID } })
        .to_string()
        .into_bytes();
    let headers = signed(&body);
    let (status, body) = post_raw("/webhook", body, headers, configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["ok"], true);
}

#[actix_web::test]
async fn webhook_applies_cancellations() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(paid_order(500_000))));
    ledger.expect_mark_order_cancelled().times(1).returning(|_, _| {
        let mut order = paid_order(500_000);
        order.status = OrderStatus::Cancelled;
        Ok(order)
    });

    let body = json!({ "eventType": "PAYMENT_CANCELED", "data": { "orderId": TEST_ORDER_ID } })
        .to_string()
        .into_bytes();
    let headers = signed(&body);
    let (status, _) = post_raw("/webhook", body, headers, configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn webhook_skips_verification_when_disabled() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(None));

    // The documented insecure default: no secret configured means no signature check.
    let body = confirmed_event_body();
    let (status, body) = post_raw("/webhook", body, vec![], configure_webhook(ledger, false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["ok"], true);
}

#[actix_web::test]
async fn webhook_reports_unparseable_bodies() {
    let _ = env_logger::try_init().ok();
    let ledger = MockOrderLedger::new();

    let body = b"not json at all".to_vec();
    let headers = signed(&body);
    let (status, body) = post_raw("/webhook", body, headers, configure_webhook(ledger, true)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["error"], "Webhook processing failed");
}
