//! A thin client for the Toss Payments API.
//!
//! Covers the parts of the API the payment gateway needs: the server-side payment
//! confirmation call, the webhook payload types, and the webhook signature scheme.
mod api;
mod config;
pub mod data_objects;
mod error;
pub mod helpers;

pub use api::{ConfirmedPayment, TossApi};
pub use config::TossConfig;
pub use data_objects::{TossPayment, WebhookEvent, WebhookEventType, WebhookPayload};
pub use error::TossApiError;
