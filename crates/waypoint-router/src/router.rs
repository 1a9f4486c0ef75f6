#![forbid(unsafe_code)]

//! The router core: a single-threaded navigation state machine.
//!
//! A [`Router`] owns the route table, the current [`RouterState`], and the
//! subscriber registry. Every navigation re-reads the history collaborator,
//! recomputes the match chain, replaces the state, and synchronously
//! notifies subscribers. Component resolution and mounting happen in a
//! spawned task so factories may be asynchronous without blocking
//! navigation itself.
//!
//! # Invariants
//!
//! 1. State is replaced, never mutated in place, and subscribers always
//!    observe a fully formed snapshot.
//! 2. Each transition increments a sequence number before notification;
//!    a mount task re-checks that number after every await and abandons
//!    itself when a newer navigation exists, so presentations never land
//!    out of order.
//! 3. A factory failure aborts the whole presentation before any shell
//!    call. The previous mount stays; the committed navigation state
//!    remains valid.
//! 4. Lifecycle is one-way: a router installs at most once and a torn-down
//!    router never navigates or notifies again.
//!
//! # Usage
//!
//! ```
//! use std::rc::Rc;
//! use waypoint_router::{
//!     Component, ComponentFactory, Html, MemoryHistory, RouteNode, Router, RouterOptions,
//! };
//!
//! struct Home;
//!
//! impl Component for Home {
//!     fn render(&self, _children: Option<&Html>) -> Html {
//!         Html::new("<h1>Home</h1>")
//!     }
//! }
//!
//! let routes = vec![RouteNode::leaf("/").component(ComponentFactory::new(|| Home))];
//! let router = Router::new(RouterOptions::new(routes, Box::new(MemoryHistory::new()))).unwrap();
//! router.navigate("/");
//! assert_eq!(router.state().matches.map(|chain| chain.len()), Some(1));
//! ```

use crate::error::{Result, RouterError};
use crate::link::{LinkHook, LinkHost, LinkInterceptor};
use crate::matcher::RouteMatch;
use crate::route::RouteNode;
use crate::state::{RouterState, SharedRegistry, SubscriberRegistry, Subscription};
use crate::table::RouteTable;
use crate::task::{LocalExecutor, Spawn};
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use waypoint_app::{AppShell, ComponentError, RootView, ShellEvent};
use waypoint_history::{Action, History, Path, To};
use web_time::Instant;

// ============================================================================
// Navigation targets
// ============================================================================

/// Where a navigation call is headed.
#[derive(Clone, Debug)]
pub enum NavigationTarget {
    /// Relative movement through the history stack.
    Offset(i32),
    /// A concrete destination.
    Destination(To),
}

impl From<i32> for NavigationTarget {
    fn from(delta: i32) -> Self {
        Self::Offset(delta)
    }
}

impl From<To> for NavigationTarget {
    fn from(to: To) -> Self {
        Self::Destination(to)
    }
}

impl From<Path> for NavigationTarget {
    fn from(path: Path) -> Self {
        Self::Destination(To::from(path))
    }
}

impl From<&str> for NavigationTarget {
    fn from(path: &str) -> Self {
        Self::Destination(To::from(path))
    }
}

impl From<String> for NavigationTarget {
    fn from(path: String) -> Self {
        Self::Destination(To::from(path))
    }
}

// ============================================================================
// Options
// ============================================================================

/// Construction-time configuration for a [`Router`].
pub struct RouterOptions {
    routes: Vec<RouteNode>,
    history: Box<dyn History>,
    link_host: Option<Rc<dyn LinkHost>>,
    mount_target: Option<String>,
    spawner: Option<Rc<dyn Spawn>>,
}

impl RouterOptions {
    /// A router over `routes`, navigating through `history`.
    #[must_use]
    pub fn new(routes: Vec<RouteNode>, history: Box<dyn History>) -> Self {
        Self { routes, history, link_host: None, mount_target: None, spawner: None }
    }

    /// Document surface for link interception. Required by
    /// [`Router::install`], unused by a headless router.
    #[must_use]
    pub fn link_host(mut self, host: Rc<dyn LinkHost>) -> Self {
        self.link_host = Some(host);
        self
    }

    /// Region id for subsequent presentations, swapping route content
    /// under a persistent shell root. See the mount policy on
    /// [`Router::install`].
    #[must_use]
    pub fn mount_target(mut self, target: impl Into<String>) -> Self {
        self.mount_target = Some(target.into());
        self
    }

    /// External task scheduler. When absent the router owns a
    /// [`LocalExecutor`] and drives it after every navigation.
    #[must_use]
    pub fn spawner(mut self, spawner: Rc<dyn Spawn>) -> Self {
        self.spawner = Some(spawner);
        self
    }
}

// ============================================================================
// Router
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Installed,
    TornDown,
}

struct RouterInner {
    table: RouteTable,
    history: RefCell<Box<dyn History>>,
    state: RefCell<RouterState>,
    subscribers: SharedRegistry,
    phase: Cell<Phase>,
    nav_seq: Cell<u64>,
    spawner: Rc<dyn Spawn>,
    default_executor: Option<LocalExecutor>,
    mount_target: Option<String>,
    link_host: Option<Rc<dyn LinkHost>>,
    interceptor: RefCell<Option<Rc<LinkInterceptor>>>,
    internal_sub: RefCell<Option<Subscription>>,
    error_hook: RefCell<Option<Rc<dyn Fn(&ComponentError)>>>,
    first_mounted: Rc<Cell<bool>>,
}

/// Handle to a router instance. Cheap to clone; all clones share state.
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Clone for Router {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl Router {
    /// Builds the route table and the initial state.
    ///
    /// Table validation happens here, never later: a `Router` in hand
    /// always carries a structurally sound table.
    pub fn new(options: RouterOptions) -> Result<Self> {
        let table = RouteTable::build(&options.routes)?;
        let (spawner, default_executor): (Rc<dyn Spawn>, Option<LocalExecutor>) =
            match options.spawner {
                Some(spawner) => (spawner, None),
                None => {
                    let executor = LocalExecutor::new();
                    (Rc::new(executor.clone()), Some(executor))
                }
            };
        let initial = RouterState {
            history_action: options.history.action(),
            location: options.history.location(),
            initialized: false,
            matches: None,
        };
        tracing::debug!(message = "router.new", routes = table.len());
        Ok(Self {
            inner: Rc::new(RouterInner {
                table,
                history: RefCell::new(options.history),
                state: RefCell::new(initial),
                subscribers: Rc::new(RefCell::new(SubscriberRegistry::default())),
                phase: Cell::new(Phase::Idle),
                nav_seq: Cell::new(0),
                spawner,
                default_executor,
                mount_target: options.mount_target,
                link_host: options.link_host,
                interceptor: RefCell::new(None),
                internal_sub: RefCell::new(None),
                error_hook: RefCell::new(None),
                first_mounted: Rc::new(Cell::new(false)),
            }),
        })
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> RouterState {
        self.inner.state.borrow().clone()
    }

    /// The validated route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.inner.table
    }

    /// Whether [`Router::install`] has completed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.inner.phase.get() == Phase::Installed
    }

    /// Navigates with the default `Push` action.
    pub fn navigate(&self, to: impl Into<NavigationTarget>) {
        self.navigate_with(to, Action::Push);
    }

    /// Pushes a new history entry and navigates to it.
    pub fn push(&self, to: impl Into<NavigationTarget>) {
        self.navigate_with(to, Action::Push);
    }

    /// Replaces the current history entry and navigates.
    pub fn replace(&self, to: impl Into<NavigationTarget>) {
        self.navigate_with(to, Action::Replace);
    }

    /// Moves through the history stack.
    pub fn go(&self, delta: i32) {
        self.navigate(delta);
    }

    /// One entry back.
    pub fn back(&self) {
        self.go(-1);
    }

    /// One entry forward.
    pub fn forward(&self) {
        self.go(1);
    }

    /// Performs one navigation transition.
    ///
    /// Offsets delegate to the history's `go`; destinations dispatch `push`
    /// or `replace` per `action`. The action stamped on the resulting state
    /// is re-read from the history, so `go` surfaces as [`Action::Pop`]
    /// regardless of what was passed here. A `Pop` action with a concrete
    /// destination refreshes state against the current location without
    /// touching history at all.
    pub fn navigate_with(&self, to: impl Into<NavigationTarget>, action: Action) {
        let inner = &self.inner;
        if inner.phase.get() == Phase::TornDown {
            tracing::warn!(message = "router.torn_down", op = "navigate");
            return;
        }
        let target = to.into();
        let stamped = {
            let mut history = inner.history.borrow_mut();
            match (&target, action) {
                (NavigationTarget::Offset(delta), _) => {
                    history.go(*delta);
                    None
                }
                (NavigationTarget::Destination(to), Action::Push) => {
                    history.push(to);
                    None
                }
                (NavigationTarget::Destination(to), Action::Replace) => {
                    history.replace(to);
                    None
                }
                (NavigationTarget::Destination(_), Action::Pop) => Some(Action::Pop),
            }
        };
        let (action, location) = {
            let history = inner.history.borrow();
            (stamped.unwrap_or_else(|| history.action()), history.location())
        };

        let seq = inner.nav_seq.get() + 1;
        inner.nav_seq.set(seq);

        let matches = inner.table.match_path(&location.pathname);
        tracing::debug!(
            message = "router.navigate",
            seq,
            action = %action,
            path = %location.pathname,
            matched = matches.len()
        );

        let initialized = inner.state.borrow().initialized;
        *inner.state.borrow_mut() = RouterState {
            history_action: action,
            location,
            initialized,
            matches: Some(matches),
        };

        self.notify();
        self.drive();
    }

    /// Registers a state callback, notified after every transition.
    ///
    /// Works at any lifecycle phase; a registration taken after
    /// [`Router::uninstall`] is kept but never notified.
    pub fn subscribe(&self, callback: impl Fn(&RouterState) + 'static) -> Subscription {
        let id = self.inner.subscribers.borrow_mut().add(Rc::new(callback));
        Subscription::new(&self.inner.subscribers, id)
    }

    /// Installs a callback for component factory failures during mount
    /// resolution. At most one; a later call replaces the earlier hook.
    pub fn on_resolve_error(&self, hook: impl Fn(&ComponentError) + 'static) {
        *self.inner.error_hook.borrow_mut() = Some(Rc::new(hook));
    }

    /// Wires the router to an application shell.
    ///
    /// Disables the shell's lazy initial render, registers the internal
    /// mount-resolution subscriber, attaches link interception to the
    /// shell's mount/unmount events, and performs exactly one initial
    /// navigation to the current history location. A second call is a
    /// warned no-op.
    ///
    /// # Errors
    ///
    /// [`RouterError::LinkHostMissing`] when no link host was configured;
    /// nothing is wired in that case.
    pub fn install(&self, app: Rc<dyn AppShell>) -> Result<()> {
        let inner = &self.inner;
        match inner.phase.get() {
            Phase::Installed => {
                tracing::warn!(message = "router.reinstall_ignored");
                return Ok(());
            }
            Phase::TornDown => {
                tracing::warn!(message = "router.torn_down", op = "install");
                return Ok(());
            }
            Phase::Idle => {}
        }
        let link_host = inner.link_host.clone().ok_or(RouterError::LinkHostMissing)?;

        app.lazy(false);

        let subscription = self.subscribe(mount_subscriber(
            Rc::downgrade(&self.inner),
            Rc::clone(&app),
            inner.mount_target.clone(),
            Rc::clone(&inner.first_mounted),
        ));
        *inner.internal_sub.borrow_mut() = Some(subscription);

        let interceptor = {
            let router = Rc::downgrade(&self.inner);
            let navigate: LinkHook = Rc::new(move |href: &str| {
                if let Some(inner) = router.upgrade() {
                    Router { inner }.navigate(href);
                }
            });
            Rc::new(LinkInterceptor::new(link_host, navigate))
        };
        *inner.interceptor.borrow_mut() = Some(Rc::clone(&interceptor));

        let on_mount = {
            let interceptor = Rc::clone(&interceptor);
            let first_mounted = Rc::clone(&inner.first_mounted);
            move || {
                interceptor.attach();
                first_mounted.set(true);
            }
        };
        app.on(ShellEvent::Mount, Rc::new(on_mount));

        let on_unmount = {
            let interceptor = Rc::clone(&interceptor);
            move || interceptor.detach()
        };
        app.on(ShellEvent::Unmount, Rc::new(on_unmount));

        let initial = inner.history.borrow().location().pathname;
        tracing::debug!(message = "router.install", path = %initial);
        self.navigate(initial.as_str());

        let refreshed = {
            let state = inner.state.borrow();
            RouterState { initialized: true, ..state.clone() }
        };
        *inner.state.borrow_mut() = refreshed;
        inner.phase.set(Phase::Installed);
        Ok(())
    }

    /// Tears the router down.
    ///
    /// Cancels the internal subscription, clears the subscriber registry,
    /// unbinds link interception, and strands any in-flight mount task on
    /// the stale guard. Terminal: the router never navigates again.
    pub fn uninstall(&self) {
        let inner = &self.inner;
        if inner.phase.get() == Phase::TornDown {
            return;
        }
        if let Some(subscription) = inner.internal_sub.borrow_mut().take() {
            subscription.cancel();
        }
        let dropped = inner.subscribers.borrow().len();
        inner.subscribers.borrow_mut().clear();
        if let Some(interceptor) = inner.interceptor.borrow_mut().take() {
            interceptor.detach();
        }
        inner.nav_seq.set(inner.nav_seq.get() + 1);
        inner.phase.set(Phase::TornDown);
        tracing::debug!(message = "router.uninstall", dropped_subscribers = dropped);
    }

    /// Runs queued mount tasks until they complete or stall. No-op when an
    /// external spawner was configured; its owner schedules instead.
    pub fn drive(&self) {
        if let Some(executor) = &self.inner.default_executor {
            executor.drive();
        }
    }

    fn notify(&self) {
        let inner = &self.inner;
        let snapshot = inner.subscribers.borrow().snapshot();
        let state = inner.state.borrow().clone();
        tracing::trace!(
            message = "router.state",
            seq = inner.nav_seq.get(),
            subscribers = snapshot.len()
        );
        for subscriber in snapshot {
            subscriber(&state);
        }
    }
}

// ============================================================================
// Mount resolution
// ============================================================================

fn mount_subscriber(
    router: Weak<RouterInner>,
    app: Rc<dyn AppShell>,
    mount_target: Option<String>,
    first_mounted: Rc<Cell<bool>>,
) -> impl Fn(&RouterState) {
    move |state: &RouterState| {
        let Some(inner) = router.upgrade() else { return };
        let Some(chain) = state.matches.clone() else { return };
        if chain.is_empty() {
            return;
        }
        let task = resolve_and_mount(
            Rc::downgrade(&inner),
            Rc::clone(&app),
            chain,
            mount_target.clone(),
            Rc::clone(&first_mounted),
            inner.nav_seq.get(),
        );
        inner.spawner.spawn_local(task.boxed_local());
    }
}

/// Resolves the active chain's components and presents them on the shell.
///
/// Holds only a weak router link so an abandoned router cannot be revived
/// by its own pending mounts.
async fn resolve_and_mount(
    router: Weak<RouterInner>,
    app: Rc<dyn AppShell>,
    chain: Vec<RouteMatch>,
    mount_target: Option<String>,
    first_mounted: Rc<Cell<bool>>,
    seq: u64,
) {
    let started = Instant::now();
    let Some(leaf) = chain.last() else { return };
    // A leaf with no component is a pass-through: nothing to present.
    let Some(leaf_factory) = leaf.component().cloned() else { return };
    let layout_factory = chain.iter().rev().find_map(|m| m.root_component().cloned());

    let leaf_component = match leaf_factory.resolve().await {
        Ok(component) => component,
        Err(err) => {
            report_resolve_error(&router, &err);
            return;
        }
    };
    if is_stale(&router, seq) {
        return;
    }

    let layout_component = match &layout_factory {
        Some(factory) => match factory.resolve().await {
            Ok(component) => Some(component),
            Err(err) => {
                report_resolve_error(&router, &err);
                return;
            }
        },
        None => None,
    };
    if is_stale(&router, seq) {
        return;
    }

    let leaf_html = leaf_component.render(None);
    let composed_view = match layout_component {
        Some(layout) => RootView::new(layout).with_children(leaf_html),
        None => RootView::new(leaf_component),
    };
    let composed_html = composed_view.render();

    match app.root_component() {
        Some(shell_factory) => {
            if !first_mounted.get() {
                let shell_root = match shell_factory.resolve().await {
                    Ok(component) => component,
                    Err(err) => {
                        report_resolve_error(&router, &err);
                        return;
                    }
                };
                if is_stale(&router, seq) {
                    return;
                }
                app.set_root(RootView::new(shell_root).with_children(composed_html));
                app.mount(None);
            } else if let Some(target) = &mount_target {
                // Region swap: the shell chrome from the first presentation
                // stays; only the routed region is replaced.
                app.set_root(composed_view);
                app.unmount();
                app.mount(Some(target.as_str()));
            } else {
                let shell_root = match shell_factory.resolve().await {
                    Ok(component) => component,
                    Err(err) => {
                        report_resolve_error(&router, &err);
                        return;
                    }
                };
                if is_stale(&router, seq) {
                    return;
                }
                app.set_root(RootView::new(shell_root).with_children(composed_html));
                app.unmount();
                app.mount(None);
            }
        }
        None => {
            if mount_target.is_some() {
                tracing::warn!(message = "router.mount_target_ignored");
            }
            app.set_root(composed_view);
            if first_mounted.get() {
                app.unmount();
            }
            app.mount(None);
        }
    }

    tracing::debug!(
        message = "router.mount",
        seq,
        elapsed_us = started.elapsed().as_micros() as u64
    );
}

fn is_stale(router: &Weak<RouterInner>, seq: u64) -> bool {
    match router.upgrade() {
        Some(inner) => {
            let current = inner.nav_seq.get();
            if current != seq {
                tracing::debug!(message = "router.mount_stale", seq, current_seq = current);
                return true;
            }
            false
        }
        None => true,
    }
}

fn report_resolve_error(router: &Weak<RouterInner>, err: &ComponentError) {
    tracing::error!(message = "router.resolve_error", error = %err);
    let hook = match router.upgrade() {
        Some(inner) => inner.error_hook.borrow().clone(),
        None => None,
    };
    if let Some(hook) = hook {
        hook(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell as StdRefCell;
    use waypoint_app::{Component, ComponentFactory, Html};
    use waypoint_history::MemoryHistory;

    struct Page(&'static str);

    impl Component for Page {
        fn render(&self, _children: Option<&Html>) -> Html {
            Html::new(format!("<p>{}</p>", self.0))
        }
    }

    fn sample_router() -> Router {
        let routes = vec![
            RouteNode::leaf("/").component(ComponentFactory::new(|| Page("home"))),
            RouteNode::prefix(
                "/users",
                vec![
                    RouteNode::index().component(ComponentFactory::new(|| Page("users"))),
                    RouteNode::leaf("/:id").component(ComponentFactory::new(|| Page("user"))),
                ],
            ),
        ];
        Router::new(RouterOptions::new(routes, Box::new(MemoryHistory::new()))).unwrap()
    }

    #[test]
    fn construction_validates_the_tree() {
        let routes = vec![RouteNode::leaf("/users/:")];
        assert!(Router::new(RouterOptions::new(routes, Box::new(MemoryHistory::new()))).is_err());
    }

    #[test]
    fn initial_state_has_no_matches() {
        let router = sample_router();
        let state = router.state();
        assert!(state.matches.is_none());
        assert!(!state.initialized);
        assert_eq!(state.location.pathname, "/");
    }

    #[test]
    fn navigate_recomputes_matches_and_stamps_the_action() {
        let router = sample_router();
        router.navigate("/users/3");
        let state = router.state();
        assert_eq!(state.history_action, Action::Push);
        assert_eq!(state.location.pathname, "/users/3");
        let chain = state.matches.unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].params().get("id"), Some("3"));
    }

    #[test]
    fn go_surfaces_as_pop() {
        let router = sample_router();
        router.navigate("/users");
        router.navigate("/users/3");
        router.go(-1);
        let state = router.state();
        assert_eq!(state.history_action, Action::Pop);
        assert_eq!(state.location.pathname, "/users");
    }

    #[test]
    fn replace_does_not_grow_history() {
        let router = sample_router();
        router.navigate("/users");
        router.replace("/users/9");
        router.back();
        // The replaced entry is gone; back lands on the original root.
        assert_eq!(router.state().location.pathname, "/");
    }

    #[test]
    fn pop_with_destination_refreshes_without_history_mutation() {
        let router = sample_router();
        router.navigate("/users");
        router.navigate_with("/ignored", Action::Pop);
        let state = router.state();
        assert_eq!(state.history_action, Action::Pop);
        assert_eq!(state.location.pathname, "/users");
    }

    #[test]
    fn subscribers_are_notified_in_registration_order() {
        let router = sample_router();
        let order = Rc::new(StdRefCell::new(Vec::new()));
        let first = Rc::clone(&order);
        let second = Rc::clone(&order);
        let _a = router.subscribe(move |_| first.borrow_mut().push("a"));
        let _b = router.subscribe(move |_| second.borrow_mut().push("b"));
        router.navigate("/users");
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn canceled_subscription_is_not_notified() {
        let router = sample_router();
        let hits = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&hits);
        let sub = router.subscribe(move |_| counter.set(counter.get() + 1));
        router.navigate("/users");
        sub.cancel();
        sub.cancel();
        router.navigate("/");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn subscriber_mutating_the_registry_does_not_disturb_the_broadcast() {
        let router = sample_router();
        let hits = Rc::new(Cell::new(0u32));
        let late_hits = Rc::new(Cell::new(0u32));
        let router_handle = router.clone();
        let late = Rc::clone(&late_hits);
        let counter = Rc::clone(&hits);
        let sub = router.subscribe(move |_| {
            counter.set(counter.get() + 1);
            let inner_late = Rc::clone(&late);
            router_handle
                .subscribe(move |_| inner_late.set(inner_late.get() + 1))
                .detach();
        });
        router.navigate("/users");
        // The late subscriber joined mid-broadcast and is not notified yet.
        assert_eq!(hits.get(), 1);
        assert_eq!(late_hits.get(), 0);
        sub.cancel();
        router.navigate("/");
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn navigate_after_uninstall_is_a_no_op() {
        let router = sample_router();
        router.navigate("/users");
        router.uninstall();
        let before = router.state();
        router.navigate("/users/3");
        let after = router.state();
        assert_eq!(before.location.pathname, after.location.pathname);
    }

    #[test]
    fn subscribe_after_uninstall_registers_but_never_fires() {
        let router = sample_router();
        router.uninstall();
        let hits = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&hits);
        let _sub = router.subscribe(move |_| counter.set(counter.get() + 1));
        router.navigate("/users");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn navigation_target_conversions() {
        assert!(matches!(NavigationTarget::from(-2), NavigationTarget::Offset(-2)));
        assert!(matches!(NavigationTarget::from("/x"), NavigationTarget::Destination(_)));
        assert!(matches!(
            NavigationTarget::from(String::from("/y")),
            NavigationTarget::Destination(_)
        ));
    }
}
