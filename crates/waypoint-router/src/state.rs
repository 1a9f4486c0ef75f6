#![forbid(unsafe_code)]

//! Observable router state and its subscriber registry.
//!
//! The router broadcasts a full [`RouterState`] snapshot after every
//! transition. Callbacks are held in an insertion-ordered registry and
//! notified in registration order; the notifying code snapshots the
//! callback list first, so a callback that subscribes or cancels during
//! notification never perturbs the in-flight broadcast.
//!
//! [`Subscription`] is an RAII guard: dropping it unsubscribes, unless it
//! was [`Subscription::detach`]ed first. It holds only a weak link to the
//! registry, so a guard outliving its router is harmless.

use crate::matcher::RouteMatch;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use waypoint_history::{Action, Location};

// ============================================================================
// State
// ============================================================================

/// Snapshot of the router after a transition.
#[derive(Clone, Debug)]
pub struct RouterState {
    /// How the current location was reached.
    pub history_action: Action,
    /// The current location.
    pub location: Location,
    /// True once [`crate::Router::install`] has completed.
    pub initialized: bool,
    /// Match chain for the current pathname. `None` before the first
    /// navigation; `Some(vec![])` when the pathname matched nothing.
    pub matches: Option<Vec<RouteMatch>>,
}

impl RouterState {
    /// The terminal element of the current match chain, if any.
    #[must_use]
    pub fn active_leaf(&self) -> Option<&RouteMatch> {
        self.matches.as_ref()?.last()
    }
}

// ============================================================================
// Registry
// ============================================================================

pub(crate) type SubscriberFn = Rc<dyn Fn(&RouterState)>;

/// Insertion-ordered callback registry. Ids are never reused.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    entries: Vec<(u64, SubscriberFn)>,
    next_id: u64,
}

impl SubscriberRegistry {
    pub(crate) fn add(&mut self, callback: SubscriberFn) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Clones the callback list for iteration outside the registry borrow.
    pub(crate) fn snapshot(&self) -> Vec<SubscriberFn> {
        self.entries.iter().map(|(_, callback)| Rc::clone(callback)).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(crate) type SharedRegistry = Rc<RefCell<SubscriberRegistry>>;

// ============================================================================
// Subscription
// ============================================================================

/// Guard for one registered state callback.
///
/// Cancels on drop. [`Subscription::cancel`] is explicit and idempotent;
/// [`Subscription::detach`] releases the guard while leaving the callback
/// registered for the life of the router.
#[must_use = "dropping a Subscription immediately unsubscribes; call detach() to keep it"]
pub struct Subscription {
    registry: Weak<RefCell<SubscriberRegistry>>,
    id: u64,
    active: Cell<bool>,
}

impl Subscription {
    pub(crate) fn new(registry: &SharedRegistry, id: u64) -> Self {
        Self { registry: Rc::downgrade(registry), id, active: Cell::new(true) }
    }

    /// Removes the callback from the registry. Safe to call repeatedly and
    /// after the router is gone.
    pub fn cancel(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
        }
    }

    /// Whether this guard still owns an active registration.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get() && self.registry.strong_count() > 0
    }

    /// Consumes the guard without unsubscribing; the callback then lives as
    /// long as the router does.
    pub fn detach(self) {
        self.active.set(false);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
