use crate::domain::order::Order;
use crate::error::OrderError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// An order taken off a station.
#[derive(Debug, Clone)]
pub enum Dequeued {
    Ready(Arc<Order>),
    /// The order was cancelled while it was queued. It is still handed out so
    /// the worker can account for it.
    Cancelled(Arc<Order>),
}

impl Dequeued {
    pub fn order(&self) -> &Arc<Order> {
        match self {
            Dequeued::Ready(order) | Dequeued::Cancelled(order) => order,
        }
    }

    pub fn into_order(self) -> Arc<Order> {
        match self {
            Dequeued::Ready(order) | Dequeued::Cancelled(order) => order,
        }
    }
}

#[derive(Debug, Default)]
struct Queue {
    orders: VecDeque<Arc<Order>>,
    closed: bool,
}

/// A bounded FIFO of orders where customers queue up for one worker.
///
/// Producers wait while the station is full, the consumer waits while it is
/// empty. Closing the station rejects further orders; orders already queued
/// can still be taken until the station is drained.
///
/// Every waiter registers for a wake-up before it inspects the queue and every
/// change to the queue wakes all waiters, which then re-check their condition.
#[derive(Debug)]
pub struct Station {
    id: usize,
    capacity: usize,
    queue: Mutex<Queue>,
    changed: Notify,
}

impl Station {
    /// Creates an open, empty station holding at most `capacity` orders.
    ///
    /// A station with capacity 0 never holds an order: [`Station::put`] waits
    /// until the station is closed.
    pub fn new(id: usize, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            queue: Mutex::new(Queue {
                orders: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
            }),
            changed: Notify::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.lock().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queues an order, waiting while the station is full.
    ///
    /// Fails with [`OrderError::Closed`] if the station is closed by the time
    /// the order would be inserted.
    pub async fn put(&self, order: Arc<Order>) -> Result<(), OrderError> {
        loop {
            let changed = self.changed.notified();
            {
                let mut queue = self.queue.lock();
                if queue.closed {
                    return Err(OrderError::Closed);
                }
                if queue.orders.len() < self.capacity {
                    queue.orders.push_back(order);
                    drop(queue);
                    self.changed.notify_waiters();
                    return Ok(());
                }
            }
            changed.await;
        }
    }

    /// Queues an order without waiting, failing with [`OrderError::Full`] if
    /// there is no room.
    pub fn try_put(&self, order: Arc<Order>) -> Result<(), OrderError> {
        let mut queue = self.queue.lock();
        if queue.closed {
            return Err(OrderError::Closed);
        }
        if queue.orders.len() >= self.capacity {
            return Err(OrderError::Full);
        }
        queue.orders.push_back(order);
        drop(queue);
        self.changed.notify_waiters();
        Ok(())
    }

    /// Takes the oldest order, waiting while the station is empty and open.
    ///
    /// Fails with [`OrderError::Closed`] once the station is closed and
    /// drained.
    pub async fn get(&self) -> Result<Dequeued, OrderError> {
        loop {
            let changed = self.changed.notified();
            {
                let mut queue = self.queue.lock();
                if let Some(order) = queue.orders.pop_front() {
                    drop(queue);
                    self.changed.notify_waiters();
                    return Ok(Self::dequeued(order));
                }
                if queue.closed {
                    return Err(OrderError::Closed);
                }
            }
            changed.await;
        }
    }

    /// Takes the oldest order without waiting, failing with
    /// [`OrderError::Empty`] if there is none.
    pub fn try_get(&self) -> Result<Dequeued, OrderError> {
        let mut queue = self.queue.lock();
        match queue.orders.pop_front() {
            Some(order) => {
                drop(queue);
                self.changed.notify_waiters();
                Ok(Self::dequeued(order))
            }
            None if queue.closed => Err(OrderError::Closed),
            None => Err(OrderError::Empty),
        }
    }

    /// Closes the station, waking everyone waiting on it.
    ///
    /// Fails with [`OrderError::Closed`] if it was already closed.
    pub fn close(&self) -> Result<(), OrderError> {
        let mut queue = self.queue.lock();
        if queue.closed {
            return Err(OrderError::Closed);
        }
        queue.closed = true;
        let pending = queue.orders.len();
        drop(queue);
        self.changed.notify_waiters();

        tracing::debug!(station = self.id, pending, "Station closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.queue.lock().closed
    }

    fn dequeued(order: Arc<Order>) -> Dequeued {
        if order.is_cancelled() {
            Dequeued::Cancelled(order)
        } else {
            Dequeued::Ready(order)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn order(inserted: i64) -> Arc<Order> {
        Arc::new(Order::new(&CancellationToken::new(), inserted, "vegan"))
    }

    #[tokio::test]
    async fn test_fifo_single_producer() {
        let station = Station::new(0, 8);
        let orders: Vec<_> = (1..=5).map(order).collect();
        for order in &orders {
            station.put(order.clone()).await.unwrap();
        }
        assert_eq!(station.len(), 5);

        for expected in &orders {
            let taken = station.get().await.unwrap().into_order();
            assert_eq!(taken.id(), expected.id());
        }
        assert!(station.is_empty());
    }

    #[tokio::test]
    async fn test_put_waits_while_full() {
        let station = Arc::new(Station::new(0, 2));
        station.put(order(1)).await.unwrap();
        station.put(order(2)).await.unwrap();

        let third = order(3);
        let producer = tokio::spawn({
            let station = station.clone();
            let third = third.clone();
            async move { station.put(third).await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!producer.is_finished());
        assert_eq!(station.len(), 2);

        station.get().await.unwrap();
        producer.await.unwrap().unwrap();
        assert_eq!(station.len(), 2);

        station.get().await.unwrap();
        assert_eq!(station.get().await.unwrap().order().id(), third.id());
    }

    #[tokio::test]
    async fn test_get_waits_for_order() {
        let station = Arc::new(Station::new(0, 2));
        let consumer = tokio::spawn({
            let station = station.clone();
            async move { station.get().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        let placed = order(50);
        station.put(placed.clone()).await.unwrap();
        let taken = consumer.await.unwrap().unwrap();
        assert_eq!(taken.order().id(), placed.id());
    }

    #[tokio::test]
    async fn test_close_rejects_puts_and_drains() {
        let station = Station::new(0, 4);
        station.put(order(1)).await.unwrap();
        station.put(order(2)).await.unwrap();

        station.close().unwrap();
        assert!(station.is_closed());
        assert_eq!(station.put(order(3)).await, Err(OrderError::Closed));
        assert_eq!(station.try_put(order(3)), Err(OrderError::Closed));

        assert_eq!(station.get().await.unwrap().order().inserted(), 1);
        assert_eq!(station.get().await.unwrap().order().inserted(), 2);
        assert!(matches!(station.get().await, Err(OrderError::Closed)));
    }

    #[tokio::test]
    async fn test_close_twice() {
        let station = Station::new(0, 1);
        station.close().unwrap();
        assert_eq!(station.close(), Err(OrderError::Closed));
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_consumer() {
        let station = Arc::new(Station::new(0, 1));
        let consumer = tokio::spawn({
            let station = station.clone();
            async move { station.get().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        station.close().unwrap();
        assert!(matches!(consumer.await.unwrap(), Err(OrderError::Closed)));
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_producer() {
        let station = Arc::new(Station::new(0, 1));
        station.put(order(1)).await.unwrap();
        let producer = tokio::spawn({
            let station = station.clone();
            async move { station.put(order(2)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        station.close().unwrap();
        assert_eq!(producer.await.unwrap(), Err(OrderError::Closed));
        assert_eq!(station.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_put_waits_until_closed() {
        let station = Arc::new(Station::new(0, 0));
        assert_eq!(station.try_put(order(1)), Err(OrderError::Full));

        let producer = tokio::spawn({
            let station = station.clone();
            async move { station.put(order(1)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!producer.is_finished());

        station.close().unwrap();
        assert_eq!(producer.await.unwrap(), Err(OrderError::Closed));
    }

    #[tokio::test]
    async fn test_cancelled_order_is_still_returned() {
        let station = Station::new(0, 2);
        let cancelled = order(50);
        station.put(cancelled.clone()).await.unwrap();
        cancelled.cancel();

        match station.get().await.unwrap() {
            Dequeued::Cancelled(taken) => assert_eq!(taken.id(), cancelled.id()),
            other => panic!("expected a cancelled order, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_try_get() {
        let station = Station::new(0, 1);
        assert!(matches!(station.try_get(), Err(OrderError::Empty)));
        station.try_put(order(1)).unwrap();
        assert_eq!(station.try_put(order(2)), Err(OrderError::Full));
        assert!(matches!(station.try_get(), Ok(Dequeued::Ready(_))));
        station.close().unwrap();
        assert!(matches!(station.try_get(), Err(OrderError::Closed)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_producers_one_consumer() {
        let station = Arc::new(Station::new(0, 3));
        let producers: Vec<_> = (0..8)
            .map(|_| {
                let station = station.clone();
                tokio::spawn(async move {
                    for i in 0..25 {
                        station.put(order(i)).await.unwrap();
                    }
                })
            })
            .collect();

        let consumer = tokio::spawn({
            let station = station.clone();
            async move {
                let mut taken = 0;
                while station.get().await.is_ok() {
                    taken += 1;
                }
                taken
            }
        });

        for producer in producers {
            producer.await.unwrap();
        }
        station.close().unwrap();
        assert_eq!(consumer.await.unwrap(), 200);
    }
}
