//! Synchronous in-process change notifier.
//!
//! # Responsibility
//! - Carry typed change notifications from the facade to view-model mirrors.
//! - Keep per-kind subscriber lists in registration order.
//!
//! # Invariants
//! - `publish` invokes every subscriber of the event kind before returning,
//!   in registration order.
//! - The subscriber list is snapshotted at the start of each dispatch:
//!   handlers registered or removed mid-dispatch only affect later publishes.
//! - A failing handler never stops delivery to the remaining subscribers.
//! - No borrow is held while a handler runs, so handlers may publish again.

use crate::event::change::{ChangeEvent, ChangeKind};
use log::{trace, warn};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Handler-side delivery failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The receiving component is not initialized (or already dropped) and
    /// misses this notification.
    MissingCollaborator(&'static str),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCollaborator(name) => {
                write!(f, "collaborator not initialized: {name}")
            }
        }
    }
}

impl Error for DispatchError {}

pub type ChangeHandler = Rc<dyn Fn(&ChangeEvent) -> Result<(), DispatchError>>;

/// Handle returned by `subscribe`; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of one `publish` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub kind: ChangeKind,
    pub delivered: usize,
    pub failed: usize,
}

/// Per-kind publish/subscribe bus. Shared through `Rc`, single-threaded.
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: RefCell<BTreeMap<ChangeKind, Vec<(SubscriptionId, ChangeHandler)>>>,
    next_subscription: Cell<u64>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for one notification kind.
    pub fn subscribe(
        &self,
        kind: ChangeKind,
        handler: impl Fn(&ChangeEvent) -> Result<(), DispatchError> + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.subscribers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        trace!(
            "event=subscriber_added module=notifier status=ok kind={}",
            kind.as_str()
        );
        id
    }

    /// Registers one handler for every notification kind under a single id.
    pub fn subscribe_all(
        &self,
        handler: impl Fn(&ChangeEvent) -> Result<(), DispatchError> + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        let handler: ChangeHandler = Rc::new(handler);
        let mut subscribers = self.subscribers.borrow_mut();
        for kind in ChangeKind::ALL {
            subscribers
                .entry(kind)
                .or_default()
                .push((id, Rc::clone(&handler)));
        }
        id
    }

    /// Removes every registration made under `id`.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for handlers in self.subscribers.borrow_mut().values_mut() {
            let before = handlers.len();
            handlers.retain(|(entry_id, _)| *entry_id != id);
            removed |= handlers.len() != before;
        }
        removed
    }

    pub fn subscriber_count(&self, kind: ChangeKind) -> usize {
        self.subscribers
            .borrow()
            .get(&kind)
            .map_or(0, |handlers| handlers.len())
    }

    /// Delivers `event` to every current subscriber of its kind.
    pub fn publish(&self, event: ChangeEvent) -> DispatchReport {
        let kind = event.kind();
        let handlers: Vec<ChangeHandler> = self
            .subscribers
            .borrow()
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, handler)| Rc::clone(handler)).collect())
            .unwrap_or_default();

        let mut report = DispatchReport {
            kind,
            delivered: 0,
            failed: 0,
        };
        for handler in handlers {
            match handler(&event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        "event=change_dispatch module=notifier status=error kind={} error={}",
                        kind.as_str(),
                        err
                    );
                }
            }
        }

        trace!(
            "event=change_published module=notifier status=ok kind={} delivered={} failed={}",
            kind.as_str(),
            report.delivered,
            report.failed
        );
        report
    }

    fn allocate_id(&self) -> SubscriptionId {
        let value = self.next_subscription.get();
        self.next_subscription.set(value + 1);
        SubscriptionId(value)
    }
}
