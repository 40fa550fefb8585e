use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use course_payment_engine::OrderFlowError;
use thiserror::Error;

/// Server-level errors. The display strings are the user-facing `error` field of the JSON
/// error body, so the payment-flow messages keep the storefront's wording.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("필수 파라미터가 누락되었습니다.")]
    MissingParameter,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Webhook processing failed")]
    WebhookProcessingFailed,
    #[error(transparent)]
    OrderFlow(#[from] OrderFlowError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::WebhookProcessingFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OrderFlow(e) => match e {
                OrderFlowError::InvalidAmount => StatusCode::BAD_REQUEST,
                OrderFlowError::AmountMismatch { .. } => StatusCode::BAD_REQUEST,
                OrderFlowError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                OrderFlowError::ConfirmationInProgress(_) => StatusCode::CONFLICT,
                OrderFlowError::ProcessorUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
                OrderFlowError::PaymentDeclined(_) => StatusCode::INTERNAL_SERVER_ERROR,
                OrderFlowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "ok": false, "error": self.to_string() }).to_string())
    }
}

#[cfg(test)]
mod test {
    use actix_web::{error::ResponseError, http::StatusCode};
    use course_payment_engine::{db_types::OrderId, OrderFlowError};
    use cpg_common::Krw;

    use super::ServerError;

    #[test]
    fn payment_flow_errors_map_to_the_documented_statuses() {
        let cases: Vec<(ServerError, StatusCode, &str)> = vec![
            (ServerError::MissingParameter, StatusCode::BAD_REQUEST, "필수 파라미터가 누락되었습니다."),
            (
                ServerError::from(OrderFlowError::InvalidAmount),
                StatusCode::BAD_REQUEST,
                "유효한 결제 금액이 필요합니다.",
            ),
            (
                ServerError::from(OrderFlowError::AmountMismatch {
                    expected: Krw::from(500_000),
                    supplied: Krw::from(400_000),
                }),
                StatusCode::BAD_REQUEST,
                "결제 금액이 일치하지 않습니다.",
            ),
            (
                ServerError::from(OrderFlowError::OrderNotFound(OrderId("order_1_0".into()))),
                StatusCode::NOT_FOUND,
                "주문을 찾을 수 없습니다.",
            ),
            (ServerError::InvalidSignature, StatusCode::UNAUTHORIZED, "Invalid signature"),
            (
                ServerError::from(OrderFlowError::ProcessorUnavailable),
                StatusCode::INTERNAL_SERVER_ERROR,
                "결제 서버 설정이 필요합니다.",
            ),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.to_string(), message);
        }
    }
}
