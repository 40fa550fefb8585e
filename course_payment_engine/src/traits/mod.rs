//! The seams of the payment engine.
//!
//! [`OrderLedger`] is implemented by storage backends (SQLite in this repo) and mocked in
//! endpoint tests. [`PaymentProcessor`] is implemented by the gateway client adapter, so
//! that the engine never depends on a concrete processor API.
mod order_ledger;
mod payment_processor;

pub use order_ledger::{OrderLedger, OrderLedgerError};
pub use payment_processor::{PaymentProcessor, ProcessorError, ProcessorPayment};
