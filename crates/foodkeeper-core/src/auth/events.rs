use tokio::sync::broadcast;
use tracing::debug;

/// Buffer size for the session event channel.
/// Events are rare; a slow subscriber only needs to see that one happened.
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Stored credentials are no longer usable; route the user to login.
    Expired,
}

/// Process-wide session event bus. Create one and hand clones to whoever
/// needs to publish or observe forced logouts.
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Announce that the session has ended. Fine to call with no subscribers.
    pub fn notify_expired(&self) {
        let receivers = self.tx.send(SessionEvent::Expired).unwrap_or(0);
        debug!(receivers = receivers, "Published session expiry");
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
