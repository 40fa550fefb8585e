//! Course Payment Engine
//!
//! The core logic of the course payment gateway: the order ledger and the payment
//! lifecycle that runs over it. The library is provider-agnostic — the external payment
//! processor and the storage backend are both traits (see [`mod@traits`]); this crate
//! ships a SQLite implementation of the ledger.
//!
//! The flow of a checkout:
//! 1. [`OrderFlowApi::create_order`] resolves the authoritative price (catalog first,
//!    client-supplied amount as fall-back) and issues a `Created` order.
//! 2. [`OrderFlowApi::confirm_order`] re-validates the amount, asks the processor to
//!    capture the charge, and settles the order as `Paid` or `Failed`. Confirming a paid
//!    order is an idempotent no-op.
//! 3. [`OrderFlowApi::apply_payment_event`] reconciles processor webhook events with the
//!    ledger out-of-band.
pub mod catalog;
pub mod db_types;
pub mod helpers;
mod order_flow;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db::create_database_if_missing, db::db_url, SqliteDatabase};

pub use order_flow::{
    ConfirmationResult,
    OrderFlowApi,
    OrderFlowError,
    DEFAULT_ORDER_NAME,
    DEFAULT_PAYMENT_METHOD,
    FALLBACK_DECLINE_MESSAGE,
};
