use super::change::ReturnedAmount;
use super::kind::OrderKind;
use crate::error::OrderError;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// What the worker reports back for an order.
pub type OrderOutcome = Result<ReturnedAmount, OrderError>;

/// A customer's order and the slot its outcome is delivered to.
///
/// The order is shared between the submitter, which awaits it and may cancel
/// it, and the worker, which writes its outcome. The outcome is written at
/// most once; every waiter observes the same value.
///
/// Cancellation is best-effort: a worker that dequeued the order before the
/// cancellation was signalled may still deliver an outcome.
#[derive(Debug)]
pub struct Order {
    id: Uuid,
    kind: String,
    inserted: i64,
    token: CancellationToken,
    outcome: watch::Sender<Option<OrderOutcome>>,
}

impl Order {
    /// Creates an order whose cancellation is tied to `parent`.
    ///
    /// Cancelling `parent` cancels the order, cancelling the order leaves
    /// `parent` untouched.
    pub fn new(parent: &CancellationToken, inserted: i64, kind: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            inserted,
            token: parent.child_token(),
            outcome: watch::Sender::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The kind as requested, which may not be a known [`OrderKind`].
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Money inserted, in cents.
    pub fn inserted(&self) -> i64 {
        self.inserted
    }

    /// Prevents the order from being processed by a worker that has not
    /// reached it yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Checks the kind and the inserted amount against the price list.
    pub fn validate(&self) -> Result<OrderKind, OrderError> {
        let kind: OrderKind = self.kind.parse()?;
        let required = kind.price();
        if self.inserted < required {
            return Err(OrderError::InsufficientPayment {
                inserted: self.inserted,
                required,
            });
        }
        Ok(kind)
    }

    /// Writes the outcome if none was written before.
    ///
    /// Returns `false` when the slot was already filled; the earlier outcome
    /// is kept.
    pub fn deliver(&self, outcome: OrderOutcome) -> bool {
        let mut outcome = Some(outcome);
        self.outcome.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = outcome.take();
            true
        })
    }

    pub fn is_delivered(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// The delivered outcome, without waiting.
    pub fn try_outcome(&self) -> Option<OrderOutcome> {
        self.outcome.borrow().clone()
    }

    /// Waits for the outcome, the cancellation of the order, or `timeout`,
    /// whichever comes first.
    ///
    /// An outcome that is already delivered always wins over a cancellation
    /// signalled afterwards.
    pub async fn wait_with_timeout(&self, timeout: Duration) -> OrderOutcome {
        let mut ready = self.outcome.subscribe();
        tokio::select! {
            biased;
            delivered = async {
                ready.wait_for(Option::is_some).await.map(|slot| (*slot).clone())
            } => match delivered {
                Ok(Some(outcome)) => outcome,
                Ok(None) => Err(OrderError::Internal("empty outcome slot".to_string())),
                Err(_) => Err(OrderError::Internal("outcome slot dropped".to_string())),
            },
            _ = self.token.cancelled() => Err(OrderError::Cancelled),
            _ = tokio::time::sleep(timeout) => Err(OrderError::Timeout),
        }
    }
}

/// The submitter's side of an order that has been queued at a station.
#[derive(Debug, Clone)]
pub struct OrderHandle(Arc<Order>);

impl OrderHandle {
    pub fn new(order: Arc<Order>) -> Self {
        Self(order)
    }

    pub fn order(&self) -> &Arc<Order> {
        &self.0
    }

    pub async fn wait(&self, timeout: Duration) -> OrderOutcome {
        self.0.wait_with_timeout(timeout).await
    }
}

impl Deref for OrderHandle {
    type Target = Order;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
