//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O, the
//! confirmation call to Toss, etc.) must be expressed as futures or asynchronous functions. Async handlers get
//! executed concurrently by worker threads and thus don't block execution.

use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Utc;
use course_payment_engine::{
    db_types::OrderId,
    traits::{OrderLedger, PaymentProcessor},
    OrderFlowApi,
    OrderFlowError,
};
use cpg_common::Krw;
use log::*;
use serde_json::json;

use crate::{
    config::ServerConfig,
    data_objects::{
        AdminLoginRequest,
        ConfirmPaymentRequest,
        ConfirmPaymentResponse,
        CreateOrderRequest,
        CreateOrderResponse,
        JsonResponse,
        OrderSummary,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  -----------------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

// ---------------------------------------------   Client key  --------------------------------------------------------
/// Hands the public Toss client key to the front-end so it can initialise the payment
/// widget. The secret key never leaves the server.
#[get("/client-key")]
pub async fn client_key(config: web::Data<ServerConfig>) -> impl Responder {
    trace!("💻️ Received client key request");
    HttpResponse::Ok().json(json!({ "clientKey": config.toss.api.client_key }))
}

// ---------------------------------------------   Admin login  -------------------------------------------------------
#[post("/admin/login")]
pub async fn admin_login(body: web::Json<AdminLoginRequest>, config: web::Data<ServerConfig>) -> HttpResponse {
    let req = body.into_inner();
    if config.admin.matches(&req.username, &req.password) {
        info!("💻️ Admin {} logged in", req.username);
        HttpResponse::Ok().json(JsonResponse::success())
    } else {
        warn!("💻️ Failed admin login attempt for {}", req.username);
        HttpResponse::Unauthorized().json(JsonResponse::failure("Invalid credentials"))
    }
}

//----------------------------------------------   Create order  ------------------------------------------------------
route!(create_order => Post "/create-order" impl OrderLedger);
/// Issues a new order for a checkout.
///
/// The charged amount is resolved server-side (catalog first, client amount as fall-back)
/// and returned to the caller together with the order id and customer key the payment
/// widget needs.
pub async fn create_order<B>(
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderLedger,
{
    trace!("💻️ Received create-order request");
    let order = api.create_order(body.into_inner().into()).await?;
    debug!("💻️ Created order [{}]", order.order_id);
    Ok(HttpResponse::Ok().json(CreateOrderResponse::from(order)))
}

//----------------------------------------------   Confirm payment  ---------------------------------------------------
route!(confirm_payment => Post "/confirm" impl OrderLedger, PaymentProcessor);
/// Confirms a payment after the widget hands control back to the storefront.
///
/// All three parameters are required. The amount is checked against the ledger before the
/// processor is called; re-confirming a paid order succeeds without a second processor
/// call, so clients may safely retry after a timeout.
pub async fn confirm_payment<B, P>(
    body: web::Json<ConfirmPaymentRequest>,
    api: web::Data<OrderFlowApi<B>>,
    processor: web::Data<P>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderLedger,
    P: PaymentProcessor,
{
    trace!("💻️ Received confirm request");
    let req = body.into_inner();
    let (Some(payment_key), Some(order_id), Some(amount)) = (req.payment_key, req.order_id, req.amount) else {
        return Err(ServerError::MissingParameter);
    };
    let order_id = OrderId::from(order_id);
    let result = api.confirm_order(processor.get_ref(), &payment_key, &order_id, Krw::from(amount)).await?;
    let message = result.was_already_paid().then(|| "이미 결제 완료된 주문입니다.".to_string());
    let order = result.into_order();
    debug!("💻️ Confirm request for order [{}] handled. Status: {}", order.order_id, order.status);
    Ok(HttpResponse::Ok().json(ConfirmPaymentResponse { ok: true, order: OrderSummary::from(order), message }))
}

//----------------------------------------------   Order audit view  --------------------------------------------------
route!(order_by_id => Get "/order/{order_id}" impl OrderLedger);
pub async fn order_by_id<B>(path: web::Path<String>, api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError>
where
    B: OrderLedger,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ GET order [{order_id}]");
    let order = api.fetch_order(&order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
    Ok(HttpResponse::Ok().json(order))
}
