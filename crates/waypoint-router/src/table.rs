#![forbid(unsafe_code)]

//! Flattened, parent-indexed route table.
//!
//! [`RouteTable::build`] walks the declarative tree in pre-order,
//! concatenates raw path prefixes, and produces a flat arena of
//! [`IndexedRoute`]s. Ancestry is a single `parent` link per entry, so the
//! matcher reconstructs a match chain by walking links instead of
//! re-walking the tree.
//!
//! # Invariants
//!
//! 1. Entry ids are dense and ascending: `entries[i].id().index() == i`.
//! 2. A parent id is always strictly smaller than its child's id, which
//!    makes cycles impossible by construction and cheap to verify.
//! 3. A resolved path is the raw concatenation of every ancestor path with
//!    the node's own path. No slash normalization is applied; `"users"`
//!    under `"/admin"` resolves to `"/adminusers"`, exactly as written.
//! 4. Entries with an empty resolved path carry no pattern and can never
//!    match; they exist only as ancestry for their descendants.
//!
//! Invariants 1 and 2 are re-checked after construction so that any future
//! table source (deserialization, incremental edits) inherits the same
//! guarantees.

use crate::error::{Result, RouterError};
use crate::pattern::PathPattern;
use crate::route::{RouteKind, RouteNode};
use std::fmt;
use waypoint_app::ComponentFactory;

// ============================================================================
// Ids
// ============================================================================

/// Index of a route in its [`RouteTable`], assigned in pre-order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(u32);

impl RouteId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of this route in the table.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Entries
// ============================================================================

/// One flattened route.
#[derive(Clone, Debug)]
pub struct IndexedRoute {
    id: RouteId,
    path: String,
    sensitive: bool,
    component: Option<ComponentFactory>,
    root_component: Option<ComponentFactory>,
    parent: Option<RouteId>,
    pattern: Option<PathPattern>,
}

impl IndexedRoute {
    /// This entry's id.
    #[must_use]
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// The resolved (prefix-concatenated) path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the path matches case-sensitively.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Terminal view factory, if any.
    #[must_use]
    pub fn component(&self) -> Option<&ComponentFactory> {
        self.component.as_ref()
    }

    /// Wrapper view factory, if any.
    #[must_use]
    pub fn root_component(&self) -> Option<&ComponentFactory> {
        self.root_component.as_ref()
    }

    /// Immediate ancestor, or `None` for a top-level entry.
    #[must_use]
    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    /// Compiled pattern; `None` when the resolved path is empty.
    #[must_use]
    pub fn pattern(&self) -> Option<&PathPattern> {
        self.pattern.as_ref()
    }

    /// Whether this entry participates in matching at all.
    #[must_use]
    pub fn is_matchable(&self) -> bool {
        self.pattern.is_some()
    }
}

// ============================================================================
// Table
// ============================================================================

/// Flat arena of routes produced from a declarative tree.
#[derive(Clone, Debug)]
pub struct RouteTable {
    entries: Vec<IndexedRoute>,
}

impl RouteTable {
    /// Flattens `routes` and validates the result.
    ///
    /// Fails if any non-empty resolved path does not compile as a pattern,
    /// or if the flattened arena violates its structural invariants.
    pub fn build(routes: &[RouteNode]) -> Result<Self> {
        let mut entries = Vec::new();
        flatten(routes, "", None, &mut entries);

        for entry in &mut entries {
            if !entry.path.is_empty() {
                entry.pattern = Some(PathPattern::compile(&entry.path, entry.sensitive)?);
            }
        }

        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the tree flattened to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by id.
    #[must_use]
    pub fn get(&self, id: RouteId) -> Option<&IndexedRoute> {
        self.entries.get(id.index())
    }

    /// Iterates entries in id order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexedRoute> {
        self.entries.iter()
    }

    fn validate(&self) -> Result<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.id.index() != index {
                return Err(RouterError::InvalidTable {
                    detail: format!("entry at position {index} carries id {}", entry.id),
                });
            }
            if let Some(parent) = entry.parent {
                if parent >= entry.id {
                    return Err(RouterError::InvalidTable {
                        detail: format!(
                            "entry {} references parent {} that does not precede it",
                            entry.id, parent
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

fn flatten(
    nodes: &[RouteNode],
    prefix: &str,
    parent: Option<RouteId>,
    out: &mut Vec<IndexedRoute>,
) {
    for node in nodes {
        let id = RouteId::from_index(out.len());
        let resolved = match node.path() {
            Some(path) => format!("{prefix}{path}"),
            None => prefix.to_string(),
        };
        out.push(IndexedRoute {
            id,
            path: resolved.clone(),
            sensitive: node.is_sensitive(),
            component: node.component_factory().cloned(),
            root_component: node.root_component_factory().cloned(),
            parent,
            pattern: None,
        });
        if let RouteKind::Layout { children } = node.kind() {
            flatten(children, &resolved, Some(id), out);
        }
    }
}
