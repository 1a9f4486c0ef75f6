#![forbid(unsafe_code)]

//! Link interception: turning anchor activations into router navigations.
//!
//! The router never touches a real document. [`LinkHost`] is the seam: it
//! enumerates the anchors that opted into interception and installs or
//! removes activation hooks on them. [`LinkInterceptor`] owns the attach
//! and detach bookkeeping so the two are always symmetric, and
//! [`MemoryDom`] is the in-process host used by tests and headless runs.
//!
//! # Invariants
//!
//! 1. `attach` followed by `detach` leaves the host exactly as it was;
//!    every bound anchor is unbound, none are visited twice.
//! 2. A second `attach` without an intervening `detach` is a no-op, as is
//!    `detach` with nothing bound.

use ahash::AHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ============================================================================
// Host seam
// ============================================================================

/// Opaque identity of an anchor within its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnchorId(u64);

impl AnchorId {
    /// Wraps a host-assigned id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// An interceptable anchor as reported by a host.
#[derive(Clone, Debug)]
pub struct Anchor {
    /// Host-scoped identity, stable across enumerations.
    pub id: AnchorId,
    /// Navigation target exactly as authored.
    pub href: String,
}

/// Callback invoked with an anchor's href when it is activated.
pub type LinkHook = Rc<dyn Fn(&str)>;

/// Document-like surface that exposes interceptable anchors.
///
/// Methods take `&self`; hosts are expected to use interior mutability,
/// matching the single-threaded model of the rest of the crate.
pub trait LinkHost {
    /// Anchors currently opted into interception.
    fn anchors(&self) -> Vec<Anchor>;
    /// Installs `hook` as the activation handler for `id`. The host must
    /// suppress its default navigation while a hook is installed.
    fn bind(&self, id: AnchorId, hook: LinkHook);
    /// Removes any installed hook from `id`, restoring default behavior.
    fn unbind(&self, id: AnchorId);
}

// ============================================================================
// Interceptor
// ============================================================================

/// Binds router navigation onto a host's anchors, symmetrically.
pub struct LinkInterceptor {
    host: Rc<dyn LinkHost>,
    navigate: LinkHook,
    bound: RefCell<Vec<AnchorId>>,
}

impl LinkInterceptor {
    /// Creates an interceptor that feeds activations into `navigate`.
    #[must_use]
    pub fn new(host: Rc<dyn LinkHost>, navigate: LinkHook) -> Self {
        Self { host, navigate, bound: RefCell::new(Vec::new()) }
    }

    /// Binds every anchor the host currently reports. No-op while bound.
    pub fn attach(&self) {
        if !self.bound.borrow().is_empty() {
            return;
        }
        let anchors = self.host.anchors();
        let mut bound = self.bound.borrow_mut();
        for anchor in anchors {
            self.host.bind(anchor.id, Rc::clone(&self.navigate));
            bound.push(anchor.id);
        }
        tracing::debug!(message = "link.attach", count = bound.len());
    }

    /// Unbinds exactly the anchors bound by the last attach.
    pub fn detach(&self) {
        let bound: Vec<AnchorId> = self.bound.borrow_mut().drain(..).collect();
        if bound.is_empty() {
            return;
        }
        for id in &bound {
            self.host.unbind(*id);
        }
        tracing::debug!(message = "link.detach", count = bound.len());
    }

    /// Number of currently bound anchors.
    #[must_use]
    pub fn bound_len(&self) -> usize {
        self.bound.borrow().len()
    }
}

// ============================================================================
// In-memory host
// ============================================================================

/// Deterministic [`LinkHost`] for tests and headless embedding.
#[derive(Default)]
pub struct MemoryDom {
    anchors: RefCell<Vec<Anchor>>,
    hooks: RefCell<AHashMap<AnchorId, LinkHook>>,
    next_id: Cell<u64>,
}

impl MemoryDom {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an interceptable anchor and returns its id.
    pub fn add_anchor(&self, href: impl Into<String>) -> AnchorId {
        let id = AnchorId::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.anchors.borrow_mut().push(Anchor { id, href: href.into() });
        id
    }

    /// Activates an anchor. Returns `true` when a hook consumed the
    /// activation, `false` when default navigation would have proceeded.
    pub fn click(&self, id: AnchorId) -> bool {
        let href = self
            .anchors
            .borrow()
            .iter()
            .find(|anchor| anchor.id == id)
            .map(|anchor| anchor.href.clone());
        let Some(href) = href else { return false };
        let hook = self.hooks.borrow().get(&id).cloned();
        match hook {
            Some(hook) => {
                hook(&href);
                true
            }
            None => false,
        }
    }

    /// Number of anchors with an installed hook.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.hooks.borrow().len()
    }
}

impl LinkHost for MemoryDom {
    fn anchors(&self) -> Vec<Anchor> {
        self.anchors.borrow().clone()
    }

    fn bind(&self, id: AnchorId, hook: LinkHook) {
        self.hooks.borrow_mut().insert(id, hook);
    }

    fn unbind(&self, id: AnchorId) {
        self.hooks.borrow_mut().remove(&id);
    }
}
