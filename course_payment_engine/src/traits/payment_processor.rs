use cpg_common::Krw;
use serde_json::Value;
use thiserror::Error;

use crate::db_types::OrderId;

/// The confirmation side of an external payment processor.
///
/// Implementations wrap the processor's HTTP API; the engine only cares about the three
/// outcomes below. Calls must carry their own bounded timeout — the order flow will not
/// hold any lock while one is in flight.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    /// Asks the processor to capture the charge for `order_id`.
    async fn confirm_payment(
        &self,
        payment_key: &str,
        order_id: &OrderId,
        amount: Krw,
    ) -> Result<ProcessorPayment, ProcessorError>;
}

/// A successful confirmation, as reported by the processor.
#[derive(Debug, Clone)]
pub struct ProcessorPayment {
    pub payment_key: String,
    /// Payment method label, e.g. "카드". Absent when the processor omits it.
    pub method: Option<String>,
    /// The processor's full response body, kept for the audit trail.
    pub raw: Value,
}

#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    /// The processor credentials are missing, so no call was attempted.
    #[error("payment processor credentials are not configured: {0}")]
    Unavailable(String),
    /// The processor rejected the charge.
    #[error("{message}")]
    Declined { message: String, raw: Value },
    /// The processor could not be reached, or did not answer in time.
    #[error("could not reach the payment processor: {0}")]
    Unreachable(String),
}
