use std::{
    collections::HashSet,
    fmt::Debug,
    sync::{Arc, Mutex},
};

use cpg_common::Krw;
use log::*;
use serde_json::json;

use crate::{
    catalog::CourseCatalog,
    db_types::{NewOrder, NewOrderRequest, Order, OrderId, PaymentCapture, PaymentEvent, PaymentEventKind},
    helpers::{generate_order_id, guest_customer_key},
    order_flow::errors::{OrderFlowError, FALLBACK_DECLINE_MESSAGE},
    traits::{OrderLedger, PaymentProcessor, ProcessorError},
};

pub const DEFAULT_ORDER_NAME: &str = "강의 신청";
pub const DEFAULT_PAYMENT_METHOD: &str = "카드";

/// `OrderFlowApi` is the primary API for the order lifecycle: issuing orders, confirming
/// payments against the external processor, and reconciling webhook events.
///
/// The in-flight set tracks orders with a processor confirmation currently on the wire. It
/// is checked-and-marked *before* the outbound call and cleared afterwards, so two
/// concurrent confirmations for one order can never both reach the processor — without
/// ever holding a lock across network latency.
pub struct OrderFlowApi<B> {
    db: B,
    catalog: CourseCatalog,
    in_flight: Arc<Mutex<HashSet<OrderId>>>,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, catalog: CourseCatalog) -> Self {
        Self { db, catalog, in_flight: Arc::new(Mutex::new(HashSet::new())) }
    }

    fn begin_confirmation(&self, order_id: &OrderId) -> Result<InFlightGuard, OrderFlowError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(order_id.clone()) {
            warn!("📦️ A confirmation for order [{order_id}] is already in flight. Rejecting the duplicate.");
            return Err(OrderFlowError::ConfirmationInProgress(order_id.clone()));
        }
        Ok(InFlightGuard { set: Arc::clone(&self.in_flight), order_id: order_id.clone() })
    }
}

impl<B> OrderFlowApi<B>
where B: OrderLedger
{
    /// Issues a new order.
    ///
    /// The charged amount is resolved server-side: a catalog match on the course slug is
    /// authoritative, and the client-supplied amount is only used when no such match
    /// exists. A non-positive resolved amount is rejected and nothing is stored.
    pub async fn create_order(&self, req: NewOrderRequest) -> Result<Order, OrderFlowError> {
        let course = req.course_slug.as_deref().and_then(|slug| self.catalog.course(slug));
        let (amount, order_name) = match course {
            Some(course) => {
                if let Some(client_amount) = req.amount {
                    if client_amount != course.price {
                        warn!(
                            "📦️ Client-supplied amount {client_amount} for course {} differs from the catalog price \
                             {}. Charging the catalog price.",
                            course.slug, course.price
                        );
                    }
                }
                (course.price, course.title.clone())
            },
            None => {
                if let Some(slug) = req.course_slug.as_deref() {
                    info!("📦️ No catalog entry for course slug {slug}. Falling back to the client-supplied amount.");
                }
                let amount = req.amount.ok_or(OrderFlowError::InvalidAmount)?;
                let order_name = req.course_title.clone().unwrap_or_else(|| DEFAULT_ORDER_NAME.to_string());
                (amount, order_name)
            },
        };
        if !amount.is_positive() {
            return Err(OrderFlowError::InvalidAmount);
        }
        let order_id = generate_order_id();
        let customer_id = req.user_id.clone().unwrap_or_else(guest_customer_key);
        let mut new_order = NewOrder::new(order_id, customer_id, order_name, amount);
        if let Some(user_id) = req.user_id {
            new_order = new_order.with_user_id(user_id);
        }
        let order = self.db.insert_order(new_order).await?;
        info!("📦️ Order [{}] created: {} for {}", order.order_id, order.order_name, order.amount);
        Ok(order)
    }

    /// Returns the order with the given public id, if it exists.
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        Ok(self.db.fetch_order_by_order_id(order_id).await?)
    }

    /// Confirms a payment with the external processor and settles the order.
    ///
    /// The supplied amount must equal the ledger amount exactly — a mismatch signals
    /// possible tampering and the processor is not called. Confirming an order that is
    /// already paid is a success and does not call the processor either.
    pub async fn confirm_order<P>(
        &self,
        processor: &P,
        payment_key: &str,
        order_id: &OrderId,
        amount: Krw,
    ) -> Result<ConfirmationResult, OrderFlowError>
    where
        P: PaymentProcessor,
    {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.amount != amount {
            warn!(
                "📦️ Amount mismatch for order [{order_id}]: ledger={}, request={amount}. Refusing to confirm.",
                order.amount
            );
            return Err(OrderFlowError::AmountMismatch { expected: order.amount, supplied: amount });
        }
        if order.is_paid() {
            info!("📦️ Order [{order_id}] is already paid. Skipping the processor call.");
            return Ok(ConfirmationResult::AlreadyPaid(order));
        }
        let _guard = self.begin_confirmation(order_id)?;
        trace!("📦️ Requesting confirmation for order [{order_id}] from the processor");
        match processor.confirm_payment(payment_key, order_id, amount).await {
            Ok(payment) => {
                let capture = PaymentCapture {
                    payment_key: Some(payment.payment_key),
                    method: Some(payment.method.unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string())),
                    raw_response: payment.raw,
                };
                let order = self.db.mark_order_paid(order_id, capture).await?;
                info!("📦️ Order [{order_id}] confirmed and paid ({})", order.amount);
                Ok(ConfirmationResult::Confirmed(order))
            },
            Err(ProcessorError::Unavailable(reason)) => {
                error!("📦️ Cannot confirm order [{order_id}]: {reason}");
                Err(OrderFlowError::ProcessorUnavailable)
            },
            Err(ProcessorError::Declined { message, raw }) => {
                warn!("📦️ Processor declined confirmation for order [{order_id}]: {message}");
                self.db.mark_order_failed(order_id, raw).await?;
                Err(OrderFlowError::PaymentDeclined(message))
            },
            Err(ProcessorError::Unreachable(reason)) => {
                error!("📦️ Processor unreachable while confirming order [{order_id}]: {reason}");
                self.db.mark_order_failed(order_id, json!({ "error": reason })).await?;
                Err(OrderFlowError::PaymentDeclined(FALLBACK_DECLINE_MESSAGE.to_string()))
            },
        }
    }

    /// Applies a verified processor event to the ledger.
    ///
    /// Events for unknown orders return `Ok(None)`: the event may reference a stale or
    /// foreign order, and the processor must not be made to retry it.
    pub async fn apply_payment_event(&self, event: PaymentEvent) -> Result<Option<Order>, OrderFlowError> {
        let Some(order) = self.db.fetch_order_by_order_id(&event.order_id).await? else {
            info!(
                "📦️ {} event references unknown order [{}]. Acknowledging without changes.",
                event.kind, event.order_id
            );
            return Ok(None);
        };
        let updated = match event.kind {
            PaymentEventKind::Confirmed => {
                if order.is_paid() {
                    debug!("📦️ Order [{}] is already paid. Duplicate confirmation event ignored.", order.order_id);
                    order
                } else {
                    let capture = PaymentCapture {
                        payment_key: event.payment_key,
                        method: event.method,
                        raw_response: event.raw,
                    };
                    self.db.mark_order_paid(&event.order_id, capture).await?
                }
            },
            PaymentEventKind::Failed => self.db.mark_order_failed(&event.order_id, event.raw).await?,
            PaymentEventKind::Cancelled => self.db.mark_order_cancelled(&event.order_id, event.raw).await?,
        };
        debug!("📦️ Payment event applied. Order [{}] is {}", updated.order_id, updated.status);
        Ok(Some(updated))
    }
}

/// Outcome of a successful confirmation call.
#[derive(Debug)]
pub enum ConfirmationResult {
    /// The processor confirmed the charge during this call.
    Confirmed(Order),
    /// The order was already paid; the processor was not called again.
    AlreadyPaid(Order),
}

impl ConfirmationResult {
    pub fn order(&self) -> &Order {
        match self {
            ConfirmationResult::Confirmed(order) | ConfirmationResult::AlreadyPaid(order) => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            ConfirmationResult::Confirmed(order) | ConfirmationResult::AlreadyPaid(order) => order,
        }
    }

    pub fn was_already_paid(&self) -> bool {
        matches!(self, ConfirmationResult::AlreadyPaid(_))
    }
}

/// Removes the order from the in-flight set when the confirmation attempt resolves,
/// whatever the outcome.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<OrderId>>>,
    order_id: OrderId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = self.set.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(&self.order_id);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn in_flight_set_rejects_concurrent_confirmations() {
        let api = OrderFlowApi::new((), CourseCatalog::default());
        let order_id = OrderId("order_1_aaaaaaaa".into());
        let other_id = OrderId("order_2_bbbbbbbb".into());

        let guard = api.begin_confirmation(&order_id).expect("first confirmation should acquire the flag");
        assert!(matches!(
            api.begin_confirmation(&order_id),
            Err(OrderFlowError::ConfirmationInProgress(_))
        ));
        // A different order is not blocked.
        let _other = api.begin_confirmation(&other_id).expect("other order must not be blocked");

        drop(guard);
        let _again = api.begin_confirmation(&order_id).expect("flag must clear once the attempt resolves");
    }
}
