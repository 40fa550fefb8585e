use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use course_payment_engine::{catalog::CourseCatalog, create_database_if_missing, OrderFlowApi, SqliteDatabase};
use toss_tools::TossApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::toss::TossProcessor,
    middleware::{HmacMiddlewareFactory, WEBHOOK_SIGNATURE_HEADER},
    routes::{admin_login, client_key, health, ConfirmPaymentRoute, CreateOrderRoute, OrderByIdRoute},
    webhook_routes::toss_webhook,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    create_database_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let toss_api = TossApi::new(config.toss.api.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, TossProcessor::new(toss_api))?;
    srv.await.map_err(|e| ServerError::InitializeError(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    processor: TossProcessor,
) -> Result<Server, ServerError> {
    let catalog = CourseCatalog::from_env_or_bundled();
    // Built once, outside the worker factory: the in-flight confirmation set must be
    // shared by every worker, or concurrent confirms on different workers could both
    // reach the processor.
    let orders_api = web::Data::new(OrderFlowApi::new(db, catalog));
    let processor = web::Data::new(processor);
    let app_config = web::Data::new(config.clone());
    let webhook_secret = config.toss.webhook_secret.clone();
    let verify_signatures = config.toss.verify_signatures();
    let srv = HttpServer::new(move || {
        let webhook_guard =
            HmacMiddlewareFactory::new(WEBHOOK_SIGNATURE_HEADER, webhook_secret.clone(), verify_signatures);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cpg::access_log"))
            .app_data(orders_api.clone())
            .app_data(processor.clone())
            .app_data(app_config.clone())
            .service(
                web::scope("/api").service(health).service(admin_login).service(
                    web::scope("/payments")
                        .service(client_key)
                        .service(CreateOrderRoute::<SqliteDatabase>::new())
                        .service(ConfirmPaymentRoute::<SqliteDatabase, TossProcessor>::new())
                        .service(OrderByIdRoute::<SqliteDatabase>::new())
                        .service(
                            web::resource("/webhook")
                                .wrap(webhook_guard)
                                .route(web::post().to(toss_webhook::<SqliteDatabase>)),
                        ),
                ),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
