use crate::domain::order::Order;
use crate::error::OrderError;
use crate::infrastructure::cash_register::CashRegister;
use crate::infrastructure::station::{Dequeued, Station};
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Counters a worker reports when it stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Orders paid and handed their change.
    pub completed: u64,
    /// Orders that received a failure outcome.
    pub rejected: u64,
    /// Cancelled orders dropped without an outcome.
    pub skipped: u64,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, rhs: Self) {
        self.completed += rhs.completed;
        self.rejected += rhs.rejected;
        self.skipped += rhs.skipped;
    }
}

/// Assembles a [`Worker`], refusing to build one without its station or
/// register.
#[derive(Debug, Default)]
pub struct WorkerBuilder {
    id: usize,
    station: Option<Arc<Station>>,
    register: Option<Arc<CashRegister>>,
}

impl WorkerBuilder {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn station(mut self, station: Arc<Station>) -> Self {
        self.station = Some(station);
        self
    }

    pub fn register(mut self, register: Arc<CashRegister>) -> Self {
        self.register = Some(register);
        self
    }

    pub fn build(self) -> Result<Worker, OrderError> {
        let station = self.station.ok_or(OrderError::StationUnavailable)?;
        let register = self.register.ok_or(OrderError::RegisterUnavailable)?;
        Ok(Worker {
            id: self.id,
            station,
            register,
            stats: WorkerStats::default(),
        })
    }
}

/// The single consumer of one station.
///
/// Takes orders off its station, validates and prices them, takes payment on
/// the shared register and delivers the outcome to the order. Per-order
/// failures are delivered to the order; the loop only ends once the station
/// is closed.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    station: Arc<Station>,
    register: Arc<CashRegister>,
    stats: WorkerStats,
}

impl Worker {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs the loop on a tokio task.
    pub fn spawn(self) -> JoinHandle<WorkerStats> {
        tokio::spawn(self.run())
    }

    /// Processes orders until the station is closed.
    pub async fn run(mut self) -> WorkerStats {
        tracing::debug!(worker = self.id, station = self.station.id(), "Worker started");

        loop {
            let order = match self.station.get().await {
                Ok(Dequeued::Ready(order)) => order,
                Ok(Dequeued::Cancelled(order)) => {
                    tracing::debug!(worker = self.id, order = %order.id(), "Skipping cancelled order");
                    self.stats.skipped += 1;
                    continue;
                }
                Err(OrderError::Closed) => break,
                Err(e) => {
                    tracing::warn!(worker = self.id, error = %e, "Failed to take order");
                    continue;
                }
            };

            let kind = match order.validate() {
                Ok(kind) => kind,
                Err(e) => {
                    self.reject(&order, e);
                    continue;
                }
            };

            // The customer may have given up while the order was validated
            if order.is_cancelled() {
                tracing::debug!(worker = self.id, order = %order.id(), "Skipping cancelled order");
                self.stats.skipped += 1;
                continue;
            }

            if self.station.is_closed() {
                self.reject(&order, OrderError::Closed);
                self.drain_closed();
                break;
            }

            match self.register.pay(kind.price(), order.inserted()) {
                Ok(returned) => {
                    tracing::info!(
                        worker = self.id,
                        order = %order.id(),
                        kind = %kind,
                        returned = returned.cents,
                        "Order completed"
                    );
                    self.stats.completed += 1;
                    order.deliver(Ok(returned));
                }
                Err(e) => self.reject(&order, e),
            }
        }

        tracing::debug!(
            worker = self.id,
            completed = self.stats.completed,
            rejected = self.stats.rejected,
            skipped = self.stats.skipped,
            "Worker stopped"
        );
        self.stats
    }

    fn reject(&mut self, order: &Order, error: OrderError) {
        tracing::info!(worker = self.id, order = %order.id(), error = %error, "Order rejected");
        self.stats.rejected += 1;
        order.deliver(Err(error));
    }

    /// Hands every order left on a closed station a `Closed` outcome.
    fn drain_closed(&mut self) {
        while let Ok(dequeued) = self.station.try_get() {
            match dequeued {
                Dequeued::Ready(order) => self.reject(&order, OrderError::Closed),
                Dequeued::Cancelled(_) => self.stats.skipped += 1,
            }
        }
    }
}
