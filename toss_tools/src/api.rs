use std::{sync::Arc, time::Duration};

use cpg_common::Krw;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde_json::{json, Value};

use crate::{config::TossConfig, data_objects::TossPayment, error::TossApiError};

/// Upper bound on any single call to the Toss API. Confirmation calls must never hang a
/// checkout indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const CONFIRM_PATH: &str = "/v1/payments/confirm";

#[derive(Clone)]
pub struct TossApi {
    config: TossConfig,
    client: Arc<Client>,
}

/// A successful confirmation: the typed payment plus the untouched response body.
#[derive(Debug, Clone)]
pub struct ConfirmedPayment {
    pub payment: TossPayment,
    pub raw: Value,
}

impl TossApi {
    pub fn new(config: TossConfig) -> Result<Self, TossApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        // Toss authenticates with HTTP Basic auth: the secret key as username, no password.
        let credentials = base64::encode(format!("{}:", config.secret_key.reveal()));
        let mut auth = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| TossApiError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TossApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn client_key(&self) -> &str {
        &self.config.client_key
    }

    /// True once a secret key has been configured. Without one, no confirmation call is
    /// ever attempted.
    pub fn is_configured(&self) -> bool {
        !self.config.secret_key.is_unset()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    async fn post_query(&self, path: &str, body: Value) -> Result<Value, TossApiError> {
        let url = self.url(path);
        trace!("💳️ Sending POST {url}");
        let response =
            self.client.post(url).json(&body).send().await.map_err(|e| TossApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ Query successful. {}", response.status());
            response.json::<Value>().await.map_err(|e| TossApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.map_err(|e| TossApiError::RequestError(e.to_string()))?;
            let raw: Value = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "message": text }));
            let code = raw.get("code").and_then(|c| c.as_str()).map(String::from);
            let message = raw
                .get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| format!("Toss Payments returned status {status}"));
            Err(TossApiError::QueryError { status, code, message, raw })
        }
    }

    /// Asks Toss to capture the charge for an order. The amount must be the ledger amount;
    /// Toss re-checks it against what the widget authorised.
    pub async fn confirm_payment(
        &self,
        payment_key: &str,
        order_id: &str,
        amount: Krw,
    ) -> Result<ConfirmedPayment, TossApiError> {
        if !self.is_configured() {
            return Err(TossApiError::MissingCredentials);
        }
        let body = json!({
            "paymentKey": payment_key,
            "orderId": order_id,
            "amount": amount.value(),
        });
        debug!("💳️ Requesting confirmation for order {order_id} ({amount})");
        let raw = self.post_query(CONFIRM_PATH, body).await?;
        let payment: TossPayment =
            serde_json::from_value(raw.clone()).map_err(|e| TossApiError::JsonError(e.to_string()))?;
        info!("💳️ Payment {} confirmed for order {order_id}", payment.payment_key);
        Ok(ConfirmedPayment { payment, raw })
    }
}
