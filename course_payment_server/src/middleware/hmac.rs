//! HMAC middleware for Actix Web.
//!
//! Toss Payments signs every webhook call by sending the base64-encoded HMAC-SHA256 of the
//! raw request body, keyed with the shared webhook secret, in the `X-Toss-Signature`
//! header.
//!
//! Wrap the webhook resource with this middleware to reject forged or tampered events
//! before any handler runs. The body is buffered for verification and re-injected
//! afterwards, so handlers can still read it.
//!
//! When no webhook secret is configured the middleware lets everything through; the
//! configuration layer warns loudly about that mode.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use cpg_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use toss_tools::helpers::verify_webhook_signature;

use crate::errors::ServerError;

pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Toss-Signature";

pub struct HmacMiddlewareFactory {
    signature_header: String,
    key: Secret<String>,
    // If false, then the middleware will not check the signature and always allow the call
    enabled: bool,
}

impl HmacMiddlewareFactory {
    pub fn new(signature_header: &str, key: Secret<String>, enabled: bool) -> Self {
        HmacMiddlewareFactory { signature_header: signature_header.into(), key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            signature_header: self.signature_header.clone(),
            key: self.key.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    signature_header: String,
    key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.reveal().clone();
        let signature_header = self.signature_header.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature for request");
            if !enabled {
                trace!("🔐️ Signature checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                Error::from(ServerError::WebhookProcessingFailed)
            })?;
            let signature = req.headers().get(&signature_header).and_then(|v| v.to_str().ok()).ok_or_else(|| {
                warn!("🔐️ No signature found in request. Denying access.");
                Error::from(ServerError::InvalidSignature)
            })?;
            if verify_webhook_signature(&secret, data.as_ref(), signature) {
                trace!("🔐️ Webhook signature check ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid signature found in request. Denying access.");
                Err(Error::from(ServerError::InvalidSignature))
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
