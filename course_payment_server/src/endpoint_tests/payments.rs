use actix_web::{http::StatusCode, web, web::ServiceConfig};
use course_payment_engine::{catalog::CourseCatalog, OrderFlowApi};
use cpg_common::{Krw, Secret};
use serde_json::json;

use super::{
    helpers::{get_path, json_body, post_json},
    mocks::{created_order, order_from_new, paid_order, stub_payment, MockOrderLedger, MockProcessor, TEST_ORDER_ID},
};
use crate::{
    config::{AdminConfig, ServerConfig},
    routes::{admin_login, client_key, health, ConfirmPaymentRoute, CreateOrderRoute, OrderByIdRoute},
};

fn configure_payments(ledger: MockOrderLedger, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(ledger, CourseCatalog::bundled());
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(processor))
            .service(CreateOrderRoute::<MockOrderLedger>::new())
            .service(ConfirmPaymentRoute::<MockOrderLedger, MockProcessor>::new())
            .service(OrderByIdRoute::<MockOrderLedger>::new());
    }
}

//----------------------------------------------   Order creation  ----------------------------------------------------

#[actix_web::test]
async fn create_order_returns_the_stored_order() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_insert_order().times(1).returning(|new_order| Ok(order_from_new(new_order)));

    let body = json!({ "amount": 500000, "courseTitle": "AI 마케팅 실무" });
    let (status, body) =
        post_json("/create-order", body, configure_payments(ledger, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::OK);
    let res = json_body(&body);
    assert_eq!(res["ok"], true);
    assert!(res["orderId"].as_str().unwrap().starts_with("order_"));
    assert_eq!(res["amount"], 500_000);
    assert_eq!(res["orderName"], "AI 마케팅 실무");
    assert!(res["customerKey"].as_str().unwrap().starts_with("guest-"));
}

#[actix_web::test]
async fn create_order_rejects_a_non_positive_amount() {
    let _ = env_logger::try_init().ok();
    // No insert expectation: storing anything would fail the test.
    let ledger = MockOrderLedger::new();

    let body = json!({ "amount": 0, "courseTitle": "AI 마케팅 실무" });
    let (status, body) =
        post_json("/create-order", body, configure_payments(ledger, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let res = json_body(&body);
    assert_eq!(res["ok"], false);
    assert_eq!(res["error"], "유효한 결제 금액이 필요합니다.");
}

#[actix_web::test]
async fn create_order_charges_the_catalog_price_for_known_slugs() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger
        .expect_insert_order()
        .withf(|new_order| new_order.amount == Krw::from(550_000) && new_order.order_name == "AI 마케팅 실무")
        .returning(|new_order| Ok(order_from_new(new_order)));

    let body = json!({ "courseSlug": "marketing-ai", "amount": 1000 });
    let (status, body) =
        post_json("/create-order", body, configure_payments(ledger, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["amount"], 550_000);
}

//----------------------------------------------   Confirmation  ------------------------------------------------------

#[actix_web::test]
async fn confirm_rejects_missing_parameters() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json(
        "/confirm",
        json!({ "orderId": TEST_ORDER_ID }),
        configure_payments(MockOrderLedger::new(), MockProcessor::new()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"], "필수 파라미터가 누락되었습니다.");
}

#[actix_web::test]
async fn confirm_rejects_unknown_orders() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(None));

    let body = json!({ "paymentKey": "tosskey_1", "orderId": "order_0_ffffffff", "amount": 500000 });
    let (status, body) = post_json("/confirm", body, configure_payments(ledger, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["error"], "주문을 찾을 수 없습니다.");
}

#[actix_web::test]
async fn confirm_rejects_a_mismatched_amount_without_touching_the_order() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(created_order(500_000))));
    // No mark_* expectations and no processor expectations: any mutation or charge
    // attempt fails the test.

    let body = json!({ "paymentKey": "tosskey_1", "orderId": TEST_ORDER_ID, "amount": 400000 });
    let (status, body) = post_json("/confirm", body, configure_payments(ledger, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let res = json_body(&body);
    assert_eq!(res["ok"], false);
    assert_eq!(res["error"], "결제 금액이 일치하지 않습니다.");
}

#[actix_web::test]
async fn confirm_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(created_order(500_000))));
    ledger
        .expect_mark_order_paid()
        .times(1)
        .withf(|_, capture| capture.payment_key.as_deref() == Some("tosskey_1"))
        .returning(|_, _| Ok(paid_order(500_000)));
    let mut processor = MockProcessor::new();
    processor.expect_confirm_payment().times(1).returning(|payment_key, _, _| Ok(stub_payment(payment_key)));

    let body = json!({ "paymentKey": "tosskey_1", "orderId": TEST_ORDER_ID, "amount": 500000 });
    let (status, body) = post_json("/confirm", body, configure_payments(ledger, processor)).await;
    assert_eq!(status, StatusCode::OK);
    let res = json_body(&body);
    assert_eq!(res["ok"], true);
    assert_eq!(res["order"]["id"], TEST_ORDER_ID);
    assert_eq!(res["order"]["amount"], 500_000);
    assert_eq!(res["order"]["method"], "카드");
    assert!(res.get("message").is_none());
}

#[actix_web::test]
async fn confirm_is_idempotent_for_paid_orders() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(paid_order(500_000))));
    let mut processor = MockProcessor::new();
    // A retry of a settled order must never reach the processor again.
    processor.expect_confirm_payment().times(0);

    let body = json!({ "paymentKey": "tosskey_1", "orderId": TEST_ORDER_ID, "amount": 500000 });
    let (status, body) = post_json("/confirm", body, configure_payments(ledger, processor)).await;
    assert_eq!(status, StatusCode::OK);
    let res = json_body(&body);
    assert_eq!(res["ok"], true);
    assert_eq!(res["message"], "이미 결제 완료된 주문입니다.");
}

#[actix_web::test]
async fn confirm_reports_a_processor_decline() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(created_order(500_000))));
    ledger.expect_mark_order_failed().times(1).returning(|_, _| {
        let mut order = created_order(500_000);
        order.status = course_payment_engine::db_types::OrderStatus::Failed;
        Ok(order)
    });
    let mut processor = MockProcessor::new();
    processor.expect_confirm_payment().times(1).returning(|_, _, _| {
        Err(course_payment_engine::traits::ProcessorError::Declined {
            message: "한도초과 혹은 잔액부족으로 결제에 실패했습니다.".to_string(),
            raw: json!({ "code": "REJECT_CARD_PAYMENT" }),
        })
    });

    let body = json!({ "paymentKey": "tosskey_1", "orderId": TEST_ORDER_ID, "amount": 500000 });
    let (status, body) = post_json("/confirm", body, configure_payments(ledger, processor)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let res = json_body(&body);
    assert_eq!(res["ok"], false);
    assert_eq!(res["error"], "한도초과 혹은 잔액부족으로 결제에 실패했습니다.");
}

//----------------------------------------------   Audit view  --------------------------------------------------------

#[actix_web::test]
async fn order_audit_view_returns_the_full_order() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(Some(paid_order(500_000))));

    let (status, body) =
        get_path(&format!("/order/{TEST_ORDER_ID}"), configure_payments(ledger, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::OK);
    let res = json_body(&body);
    assert_eq!(res["orderId"], TEST_ORDER_ID);
    assert_eq!(res["status"], "Paid");
    assert_eq!(res["paymentKey"], "tosskey_1");
}

#[actix_web::test]
async fn order_audit_view_handles_unknown_orders() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockOrderLedger::new();
    ledger.expect_fetch_order_by_order_id().returning(|_| Ok(None));

    let (status, body) =
        get_path("/order/order_0_ffffffff", configure_payments(ledger, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["error"], "주문을 찾을 수 없습니다.");
}

//----------------------------------------------   Misc routes  -------------------------------------------------------

fn configure_misc(cfg: &mut ServiceConfig) {
    let config = ServerConfig {
        admin: AdminConfig { username: "admin".to_string(), password: Secret::new("s3cret-pw".to_string()) },
        ..ServerConfig::default()
    };
    cfg.app_data(web::Data::new(config)).service(health).service(client_key).service(admin_login);
}

#[actix_web::test]
async fn health_reports_ok() {
    let (status, body) = get_path("/health", configure_misc).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["status"], "ok");
}

#[actix_web::test]
async fn client_key_is_served_to_the_front_end() {
    let (status, body) = get_path("/client-key", configure_misc).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json_body(&body).get("clientKey").is_some());
}

#[actix_web::test]
async fn admin_login_checks_credentials() {
    let (status, body) =
        post_json("/admin/login", json!({ "username": "admin", "password": "s3cret-pw" }), configure_misc).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["success"], true);

    let (status, body) =
        post_json("/admin/login", json!({ "username": "admin", "password": "wrong" }), configure_misc).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let res = json_body(&body);
    assert_eq!(res["success"], false);
    assert_eq!(res["message"], "Invalid credentials");
}
