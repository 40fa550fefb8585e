use cpg_common::Krw;
use thiserror::Error;

use crate::{db_types::OrderId, traits::OrderLedgerError};

/// Shown to the caller when the processor declined a payment without a usable message.
pub const FALLBACK_DECLINE_MESSAGE: &str = "결제 승인 중 오류가 발생했습니다.";

/// Errors surfaced by the order flow. The display strings double as the user-facing
/// messages of the storefront API, so the payment-flow variants keep its Korean wording.
#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("유효한 결제 금액이 필요합니다.")]
    InvalidAmount,
    #[error("주문을 찾을 수 없습니다.")]
    OrderNotFound(OrderId),
    #[error("결제 금액이 일치하지 않습니다.")]
    AmountMismatch { expected: Krw, supplied: Krw },
    #[error("이미 결제 승인이 진행 중입니다.")]
    ConfirmationInProgress(OrderId),
    #[error("결제 서버 설정이 필요합니다.")]
    ProcessorUnavailable,
    #[error("{0}")]
    PaymentDeclined(String),
    #[error("서버 내부 오류가 발생했습니다.")]
    Storage(#[from] OrderLedgerError),
}
