//! Adapts the Toss client onto the engine's [`PaymentProcessor`] seam.

use course_payment_engine::{
    db_types::OrderId,
    traits::{PaymentProcessor, ProcessorError, ProcessorPayment},
    FALLBACK_DECLINE_MESSAGE,
};
use cpg_common::Krw;
use log::debug;
use toss_tools::{TossApi, TossApiError};

#[derive(Clone)]
pub struct TossProcessor {
    api: TossApi,
}

impl TossProcessor {
    pub fn new(api: TossApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &TossApi {
        &self.api
    }
}

impl PaymentProcessor for TossProcessor {
    async fn confirm_payment(
        &self,
        payment_key: &str,
        order_id: &OrderId,
        amount: Krw,
    ) -> Result<ProcessorPayment, ProcessorError> {
        match self.api.confirm_payment(payment_key, order_id.as_str(), amount).await {
            Ok(confirmed) => Ok(ProcessorPayment {
                payment_key: confirmed.payment.payment_key,
                method: confirmed.payment.method,
                raw: confirmed.raw,
            }),
            Err(TossApiError::MissingCredentials) => {
                Err(ProcessorError::Unavailable("CPG_TOSS_SECRET_KEY is not set".to_string()))
            },
            Err(TossApiError::QueryError { status, code, message, raw }) => {
                debug!("💳️ Toss declined the confirmation. Status {status}, code {code:?}");
                // Only pass a message on to the payer when Toss actually sent one.
                let message = if code.is_some() { message } else { FALLBACK_DECLINE_MESSAGE.to_string() };
                Err(ProcessorError::Declined { message, raw })
            },
            Err(e) => Err(ProcessorError::Unreachable(e.to_string())),
        }
    }
}
