//! Queue notifications and observer registration.

use std::sync::Arc;

use parking_lot::RwLock;

use super::types::ItemStatus;

/// Notification emitted by the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    ItemAdded { id: String, index: usize },
    ItemRemoved { id: String },
    ItemStatusChanged { id: String, status: ItemStatus },
    /// Current-step description of a working item.
    ItemProgress { id: String, description: String },
    RunStarted,
    RunCompleted { had_failures: bool },
    RunCancelled,
}

/// Observer callback. Called on whichever thread made the change.
pub type QueueObserver = Arc<dyn Fn(&QueueEvent) + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscription list owned by the queue store.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: RwLock<u64>,
    entries: RwLock<Vec<(SubscriptionId, QueueObserver)>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, observer: QueueObserver) -> SubscriptionId {
        let id = {
            let mut next = self.next_id.write();
            *next += 1;
            SubscriptionId(*next)
        };
        self.entries.write().push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(sub, _)| *sub != id);
        entries.len() != before
    }

    /// Deliver an event to every observer.
    ///
    /// The list is cloned first so observers may subscribe or unsubscribe
    /// from inside a callback.
    pub(crate) fn emit(&self, event: &QueueEvent) {
        let observers: Vec<QueueObserver> =
            self.entries.read().iter().map(|(_, o)| o.clone()).collect();
        for observer in observers {
            observer(event);
        }
    }
}
