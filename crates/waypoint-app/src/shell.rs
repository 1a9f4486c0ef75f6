#![forbid(unsafe_code)]

//! Application shell: the mount collaborator.
//!
//! The shell owns the place a view lands in (a document, a test buffer)
//! and the application's own pre-declared root component, if any. The
//! router composes a [`RootView`] and asks the shell to mount it; the
//! shell renders and reports lifecycle transitions through registered
//! hooks.
//!
//! [`MemoryShell`] is the host-driven, deterministic implementation:
//! "mounting" writes markup into an in-memory target registry and every
//! operation is recorded, so tests can assert the exact mount sequence.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ahash::AHashMap;

use crate::component::{Component, ComponentFactory, Html};

// ============================================================================
// Contract
// ============================================================================

/// Shell lifecycle transitions observable via [`AppShell::on`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShellEvent {
    /// A view finished mounting.
    Mount,
    /// The mounted view was removed.
    Unmount,
}

/// Lifecycle hook callback.
pub type ShellHook = Rc<dyn Fn()>;

/// The root to present: a resolved component plus injected children.
#[derive(Clone)]
pub struct RootView {
    pub component: Rc<dyn Component>,
    pub children: Option<Html>,
}

impl RootView {
    #[must_use]
    pub fn new(component: Rc<dyn Component>) -> Self {
        Self {
            component,
            children: None,
        }
    }

    /// Inject composed child markup (the `_children` slot).
    #[must_use]
    pub fn with_children(mut self, children: Html) -> Self {
        self.children = Some(children);
        self
    }

    /// Render the root with its children injected.
    #[must_use]
    pub fn render(&self) -> Html {
        self.component.render(self.children.as_ref())
    }
}

impl std::fmt::Debug for RootView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootView")
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// The mount collaborator contract.
///
/// Methods take `&self`; implementations use interior mutability. All
/// calls happen on one logical execution context.
pub trait AppShell {
    /// Toggle deferred initial rendering. The router disables laziness at
    /// install time so the first navigation paints immediately.
    fn lazy(&self, lazy: bool);

    /// The application's own pre-declared root component, if any.
    fn root_component(&self) -> Option<ComponentFactory>;

    /// Stage the next root view. Takes effect at the next [`mount`].
    ///
    /// [`mount`]: AppShell::mount
    fn set_root(&self, view: RootView);

    /// Render the staged root into `target` (`None` = the shell's default
    /// target) and fire [`ShellEvent::Mount`] hooks.
    fn mount(&self, target: Option<&str>);

    /// Remove the mounted view and fire [`ShellEvent::Unmount`] hooks.
    fn unmount(&self);

    /// Register a lifecycle hook. Hooks are never removed; they run in
    /// registration order after the operation completes.
    fn on(&self, event: ShellEvent, hook: ShellHook);
}

// ============================================================================
// MemoryShell
// ============================================================================

/// One recorded shell operation, for test inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellOp {
    Lazy(bool),
    SetRoot,
    Mount { target: String },
    Unmount,
}

/// Deterministic in-memory [`AppShell`].
///
/// Targets are named regions in a flat registry. Mounting renders the
/// staged root into one region; unmounting clears the region it last
/// mounted into. Mounting into a different region leaves the previous
/// region's markup behind, the way a real document would.
pub struct MemoryShell {
    default_target: String,
    root_component: RefCell<Option<ComponentFactory>>,
    staged: RefCell<Option<RootView>>,
    lazy: Cell<bool>,
    mounted_at: RefCell<Option<String>>,
    targets: RefCell<AHashMap<String, Html>>,
    hooks: RefCell<Vec<(ShellEvent, ShellHook)>>,
    ops: RefCell<Vec<ShellOp>>,
}

impl MemoryShell {
    /// Shell with the default target region `"app"` and no declared root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_target("app")
    }

    /// Shell with a custom default target region.
    #[must_use]
    pub fn with_default_target(target: impl Into<String>) -> Self {
        Self {
            default_target: target.into(),
            root_component: RefCell::new(None),
            staged: RefCell::new(None),
            lazy: Cell::new(true),
            mounted_at: RefCell::new(None),
            targets: RefCell::new(AHashMap::new()),
            hooks: RefCell::new(Vec::new()),
            ops: RefCell::new(Vec::new()),
        }
    }

    /// Declare the application's own root component.
    #[must_use]
    pub fn with_root(self, factory: ComponentFactory) -> Self {
        *self.root_component.borrow_mut() = Some(factory);
        self
    }

    /// Markup currently mounted in `target`, if any.
    #[must_use]
    pub fn document(&self, target: &str) -> Option<Html> {
        self.targets.borrow().get(target).cloned()
    }

    /// Whether a view is currently mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted_at.borrow().is_some()
    }

    /// The region the current view is mounted in.
    #[must_use]
    pub fn mounted_target(&self) -> Option<String> {
        self.mounted_at.borrow().clone()
    }

    /// Whether deferred initial rendering is enabled.
    #[must_use]
    pub fn is_lazy(&self) -> bool {
        self.lazy.get()
    }

    /// Snapshot of every recorded operation, oldest first.
    #[must_use]
    pub fn ops(&self) -> Vec<ShellOp> {
        self.ops.borrow().clone()
    }

    /// Number of completed mounts.
    #[must_use]
    pub fn mount_count(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, ShellOp::Mount { .. }))
            .count()
    }

    fn fire(&self, event: ShellEvent) {
        // Snapshot so a hook registering another hook cannot affect this
        // notification round.
        let hooks: Vec<ShellHook> = self
            .hooks
            .borrow()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for hook in hooks {
            hook();
        }
    }
}

impl Default for MemoryShell {
    fn default() -> Self {
        Self::new()
    }
}

impl AppShell for MemoryShell {
    fn lazy(&self, lazy: bool) {
        self.lazy.set(lazy);
        self.ops.borrow_mut().push(ShellOp::Lazy(lazy));
    }

    fn root_component(&self) -> Option<ComponentFactory> {
        self.root_component.borrow().clone()
    }

    fn set_root(&self, view: RootView) {
        *self.staged.borrow_mut() = Some(view);
        self.ops.borrow_mut().push(ShellOp::SetRoot);
    }

    fn mount(&self, target: Option<&str>) {
        let target = target.unwrap_or(&self.default_target).to_string();
        // Render with no shell borrow held: render runs arbitrary component
        // code that may touch the shell again.
        let staged = self.staged.borrow().clone();
        if let Some(view) = staged {
            let markup = view.render();
            self.targets.borrow_mut().insert(target.clone(), markup);
        }
        *self.mounted_at.borrow_mut() = Some(target.clone());
        self.ops.borrow_mut().push(ShellOp::Mount {
            target: target.clone(),
        });
        tracing::debug!(message = "shell.mount", target = %target);
        self.fire(ShellEvent::Mount);
    }

    fn unmount(&self) {
        if let Some(target) = self.mounted_at.borrow_mut().take() {
            self.targets.borrow_mut().remove(&target);
            self.ops.borrow_mut().push(ShellOp::Unmount);
            tracing::debug!(message = "shell.unmount", target = %target);
            self.fire(ShellEvent::Unmount);
        }
    }

    fn on(&self, event: ShellEvent, hook: ShellHook) {
        self.hooks.borrow_mut().push((event, hook));
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct Page(&'static str);

    impl Component for Page {
        fn render(&self, children: Option<&Html>) -> Html {
            match children {
                Some(inner) => Html::new(format!("<{0}>{1}</{0}>", self.0, inner)),
                None => Html::new(format!("<{0}/>", self.0)),
            }
        }
    }

    #[test]
    fn mount_renders_into_default_target() {
        let shell = MemoryShell::new();
        shell.set_root(RootView::new(Rc::new(Page("home"))));
        shell.mount(None);
        assert_eq!(shell.document("app").unwrap().as_str(), "<home/>");
        assert!(shell.is_mounted());
        assert_eq!(shell.mounted_target().as_deref(), Some("app"));
    }

    #[test]
    fn mount_renders_children() {
        let shell = MemoryShell::new();
        let view = RootView::new(Rc::new(Page("layout"))).with_children(Html::new("<p/>"));
        shell.set_root(view);
        shell.mount(None);
        assert_eq!(shell.document("app").unwrap().as_str(), "<layout><p/></layout>");
    }

    #[test]
    fn unmount_clears_the_mounted_region() {
        let shell = MemoryShell::new();
        shell.set_root(RootView::new(Rc::new(Page("home"))));
        shell.mount(None);
        shell.unmount();
        assert_eq!(shell.document("app"), None);
        assert!(!shell.is_mounted());
    }

    #[test]
    fn unmount_without_mount_is_a_no_op() {
        let shell = MemoryShell::new();
        shell.unmount();
        assert_eq!(shell.ops(), vec![]);
    }

    #[test]
    fn explicit_target_overrides_default() {
        let shell = MemoryShell::new();
        shell.set_root(RootView::new(Rc::new(Page("pane"))));
        shell.mount(Some("sidebar"));
        assert_eq!(shell.document("sidebar").unwrap().as_str(), "<pane/>");
        assert_eq!(shell.document("app"), None);
    }

    #[test]
    fn hooks_fire_after_the_operation() {
        let shell = Rc::new(MemoryShell::new());
        let seen = Rc::new(Cell::new(false));

        let shell_for_hook = Rc::clone(&shell);
        let seen_for_hook = Rc::clone(&seen);
        shell.on(
            ShellEvent::Mount,
            Rc::new(move || {
                // The view is already present when the hook runs.
                assert!(shell_for_hook.document("app").is_some());
                seen_for_hook.set(true);
            }),
        );

        shell.set_root(RootView::new(Rc::new(Page("home"))));
        shell.mount(None);
        assert!(seen.get());
    }

    #[test]
    fn ops_record_the_sequence() {
        let shell = MemoryShell::new();
        shell.lazy(false);
        shell.set_root(RootView::new(Rc::new(Page("a"))));
        shell.mount(None);
        shell.unmount();
        assert_eq!(
            shell.ops(),
            vec![
                ShellOp::Lazy(false),
                ShellOp::SetRoot,
                ShellOp::Mount {
                    target: "app".into()
                },
                ShellOp::Unmount,
            ]
        );
        assert_eq!(shell.mount_count(), 1);
    }

    #[test]
    fn declared_root_component_is_exposed() {
        let shell = MemoryShell::new().with_root(ComponentFactory::new(|| Page("chrome")));
        assert!(shell.root_component().is_some());
        assert!(MemoryShell::new().root_component().is_none());
    }
}
