use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TossApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach Toss Payments: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Toss Payments rejected the call. Error {status}. {message}")]
    QueryError { status: u16, code: Option<String>, message: String, raw: Value },
    #[error("The Toss Payments secret key is not configured")]
    MissingCredentials,
}
