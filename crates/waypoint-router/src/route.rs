#![forbid(unsafe_code)]

//! Declarative route tree nodes.
//!
//! Applications describe navigation as a tree of [`RouteNode`]s: leaves are
//! terminal destinations, layouts group children under a shared path prefix
//! and (optionally) a shared wrapper component. The tree is a pure
//! description; [`crate::RouteTable::build`] flattens it into the indexed
//! form the matcher consumes.
//!
//! # Usage
//!
//! ```
//! use waypoint_router::RouteNode;
//!
//! let routes = vec![
//!     RouteNode::leaf("/"),
//!     RouteNode::prefix("/users", vec![
//!         RouteNode::index(),
//!         RouteNode::leaf("/:id"),
//!     ]),
//! ];
//! assert_eq!(routes.len(), 2);
//! ```

use waypoint_app::ComponentFactory;

/// Whether a node terminates matching or groups children.
#[derive(Clone, Debug)]
pub enum RouteKind {
    /// A terminal destination.
    Leaf,
    /// A grouping node whose path (if any) prefixes every descendant.
    Layout {
        /// Child nodes, flattened in declaration order.
        children: Vec<RouteNode>,
    },
}

/// One node of the declarative route tree.
#[derive(Clone, Debug)]
pub struct RouteNode {
    path: Option<String>,
    sensitive: bool,
    component: Option<ComponentFactory>,
    root_component: Option<ComponentFactory>,
    kind: RouteKind,
}

impl RouteNode {
    fn new(path: Option<String>, kind: RouteKind) -> Self {
        Self { path, sensitive: false, component: None, root_component: None, kind }
    }

    /// A terminal route at `path` (relative to its parent's prefix).
    #[must_use]
    pub fn leaf(path: impl Into<String>) -> Self {
        Self::new(Some(path.into()), RouteKind::Leaf)
    }

    /// A terminal route with no path of its own; it matches its parent's
    /// prefix exactly.
    #[must_use]
    pub fn index() -> Self {
        Self::new(None, RouteKind::Leaf)
    }

    /// A pathless grouping node. Contributes no prefix; useful for wrapping
    /// an entire tree in one shared layout component.
    #[must_use]
    pub fn layout(children: Vec<RouteNode>) -> Self {
        Self::new(None, RouteKind::Layout { children })
    }

    /// A grouping node whose `path` prefixes every descendant.
    #[must_use]
    pub fn prefix(path: impl Into<String>, children: Vec<RouteNode>) -> Self {
        Self::new(Some(path.into()), RouteKind::Layout { children })
    }

    /// Sets the view rendered when this route is the terminal match.
    #[must_use]
    pub fn component(mut self, factory: ComponentFactory) -> Self {
        self.component = Some(factory);
        self
    }

    /// Sets the wrapper view composed around descendant content.
    #[must_use]
    pub fn root_component(mut self, factory: ComponentFactory) -> Self {
        self.root_component = Some(factory);
        self
    }

    /// Opts this node's resolved path into case-sensitive matching.
    #[must_use]
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// The node's own path segment, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Whether this node's resolved path matches case-sensitively.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// The terminal view factory, if configured.
    #[must_use]
    pub fn component_factory(&self) -> Option<&ComponentFactory> {
        self.component.as_ref()
    }

    /// The wrapper view factory, if configured.
    #[must_use]
    pub fn root_component_factory(&self) -> Option<&ComponentFactory> {
        self.root_component.as_ref()
    }

    /// Leaf or layout.
    #[must_use]
    pub fn kind(&self) -> &RouteKind {
        &self.kind
    }

    /// Children of a layout node; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[RouteNode] {
        match &self.kind {
            RouteKind::Layout { children } => children,
            RouteKind::Leaf => &[],
        }
    }
}
