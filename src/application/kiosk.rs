use super::worker::{WorkerBuilder, WorkerStats};
use crate::domain::change::ReturnedAmount;
use crate::domain::order::{Order, OrderHandle};
use crate::error::OrderError;
use crate::infrastructure::cash_register::CashRegister;
use crate::infrastructure::station::Station;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How many stations to open and how they behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskConfig {
    /// Number of stations, each served by its own worker.
    pub stations: usize,
    /// Orders a station can hold before customers have to wait.
    pub capacity: usize,
    /// How long [`Kiosk::process`] waits for an order before giving up.
    pub order_timeout: Duration,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            stations: 3,
            capacity: 1 << 10,
            order_timeout: Duration::from_secs(10 * 60),
        }
    }
}

/// The order-fulfillment point: a set of stations, one worker per station,
/// and one cash register shared by all workers.
///
/// `Kiosk` is the entry point for submitting orders and awaiting their
/// outcome.
pub struct Kiosk {
    config: KioskConfig,
    stations: Vec<Arc<Station>>,
    register: Arc<CashRegister>,
    workers: Vec<JoinHandle<WorkerStats>>,
}

impl Kiosk {
    /// Opens a kiosk with a freshly stocked register.
    ///
    /// Must be called from within a tokio runtime, the workers are spawned
    /// onto it.
    pub fn start(config: KioskConfig) -> Result<Self, OrderError> {
        Self::with_register(config, Arc::new(CashRegister::new()))
    }

    /// Opens a kiosk whose workers share `register`.
    pub fn with_register(config: KioskConfig, register: Arc<CashRegister>) -> Result<Self, OrderError> {
        if config.stations == 0 {
            return Err(OrderError::InvalidConfig);
        }

        let mut stations = Vec::with_capacity(config.stations);
        let mut workers = Vec::with_capacity(config.stations);
        for id in 0..config.stations {
            let station = Arc::new(Station::new(id, config.capacity));
            let worker = WorkerBuilder::new(id)
                .station(station.clone())
                .register(register.clone())
                .build()?;
            workers.push(worker.spawn());
            stations.push(station);
        }

        tracing::info!(
            stations = config.stations,
            capacity = config.capacity,
            "Kiosk opened"
        );

        Ok(Self {
            config,
            stations,
            register,
            workers,
        })
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn stations(&self) -> &[Arc<Station>] {
        &self.stations
    }

    pub fn station(&self, id: usize) -> Result<&Arc<Station>, OrderError> {
        self.stations.get(id).ok_or(OrderError::StationUnavailable)
    }

    pub fn register(&self) -> &Arc<CashRegister> {
        &self.register
    }

    /// Queues an order at `station`, waiting while the station is full.
    ///
    /// The order is cancelled when `parent` is.
    pub async fn submit(
        &self,
        station: usize,
        kind: impl Into<String>,
        inserted: i64,
        parent: &CancellationToken,
    ) -> Result<OrderHandle, OrderError> {
        let station = self.station(station)?;
        let order = Arc::new(Order::new(parent, inserted, kind));
        station.put(order.clone()).await?;
        Ok(OrderHandle::new(order))
    }

    /// Submits an order and waits for its outcome up to the configured
    /// timeout.
    ///
    /// An order that timed out is cancelled, so a worker that has not taken
    /// it yet skips it. A worker that already has it may still process it.
    pub async fn process(
        &self,
        station: usize,
        kind: impl Into<String>,
        inserted: i64,
        parent: &CancellationToken,
    ) -> Result<ReturnedAmount, OrderError> {
        let handle = self.submit(station, kind, inserted, parent).await?;
        let outcome = handle.wait(self.config.order_timeout).await;
        if matches!(outcome, Err(OrderError::Timeout)) {
            handle.cancel();
        }
        outcome
    }

    /// Closes every station and waits for the workers to finish.
    pub async fn shutdown(self) -> WorkerStats {
        for station in &self.stations {
            // Someone else may have closed it already
            let _ = station.close();
        }

        let mut total = WorkerStats::default();
        for (id, worker) in self.workers.into_iter().enumerate() {
            match worker.await {
                Ok(stats) => total += stats,
                Err(e) => tracing::error!(worker = id, error = %e, "Worker failed"),
            }
        }

        tracing::info!(
            completed = total.completed,
            rejected = total.rejected,
            skipped = total.skipped,
            "Kiosk closed"
        );
        total
    }
}
