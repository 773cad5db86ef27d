//! Change notifications for store subscribers.

use rust_decimal::Decimal;
use tokio::sync::broadcast;

/// A change to one of the store's states.
///
/// Events carry a summary only; subscribers read the store for the full
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CartChanged { lines: usize, total: Decimal },
    WishlistChanged { count: usize },
    AuthChanged { signed_in: bool },
    ProductsChanged,
    CategoriesChanged,
}

/// Broadcast channel for [`StoreEvent`]s.
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Returns how many subscribers it reached.
    pub fn publish(&self, event: StoreEvent) -> usize {
        // send only fails when nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }
}

/// A subscriber's end of the [`EventBus`].
pub struct Subscription {
    receiver: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    /// Wait for the next event. Returns `None` once the store is dropped.
    ///
    /// A subscriber that falls more than the bus capacity behind skips the
    /// oldest events.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Store subscriber lagged, skipped events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Store subscriber lagged, skipped events");
                }
                Err(_) => return None,
            }
        }
    }

    /// Drain every buffered event.
    pub fn drain(&mut self) -> Vec<StoreEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
