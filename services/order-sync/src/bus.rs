//! Best-effort event bus
//!
//! Named broadcast channels with at-most-once delivery per connected
//! subscriber. Publishing to a channel nobody listens on succeeds and
//! reaches zero receivers; a slow subscriber that overruns the channel
//! buffer gets a `Lagged` signal and is expected to fall back to polling
//! the order authority.

use crate::events::OrderEvent;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

/// Buffered events per channel before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The channel's sender side is gone; degrade to polling.
    #[error("Event bus unavailable")]
    Unavailable,

    /// The subscriber fell behind and missed `missed` events. Not fatal:
    /// the reconciler marks its cache dirty and repairs on the next poll.
    #[error("Subscriber lagged, {missed} events dropped")]
    Lagged { missed: u64 },
}

/// Handle to the in-process bus; cheap to clone across tasks.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<OrderEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event. Returns how many subscribers received it;
    /// zero is a normal outcome, never an error.
    pub fn publish(&self, channel: &str, event: OrderEvent) -> usize {
        let sender = self.sender_for(channel);
        match sender.send(event) {
            Ok(receivers) => receivers,
            // Send only fails when there are no receivers
            Err(_) => 0,
        }
    }

    /// Open a subscription that sees events published from now on.
    pub fn subscribe(&self, channel: &str) -> Subscription {
        Subscription {
            rx: self.sender_for(channel).subscribe(),
        }
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<OrderEvent> {
        if let Some(sender) = self
            .channels
            .read()
            .expect("bus lock poisoned")
            .get(channel)
        {
            return sender.clone();
        }
        let mut channels = self.channels.write().expect("bus lock poisoned");
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

/// One subscriber's view of a channel. Infinite and not restartable:
/// dropping it and subscribing again loses anything in between.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<OrderEvent>,
}

impl Subscription {
    /// Wait for the next event.
    pub async fn recv(&mut self) -> Result<OrderEvent, BusError> {
        match self.rx.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Closed) => Err(BusError::Unavailable),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event bus subscriber lagged");
                Err(BusError::Lagged { missed })
            }
        }
    }

    /// Drain whatever is already buffered without waiting.
    pub fn try_recv(&mut self) -> Result<Option<OrderEvent>, BusError> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(BusError::Unavailable),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                Err(BusError::Lagged { missed })
            }
        }
    }
}
