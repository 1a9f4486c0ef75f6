#![forbid(unsafe_code)]

//! Path matching against a [`RouteTable`].
//!
//! Entries are probed in ascending id order and the first pattern that
//! accepts the pathname wins outright; no scoring, no backtracking.
//! Declaration order is therefore the only tiebreaker, and a broad
//! parameterized route declared before a literal sibling shadows it.
//!
//! A successful match expands into a chain: every layout ancestor of the
//! winner (root first), then the winner itself. Captured parameters are
//! attached to the terminal element only, and the terminal's parent link is
//! cleared so a chain is always terminated structurally as well as
//! positionally.

use crate::params::Params;
use crate::table::{IndexedRoute, RouteId, RouteTable};
use smallvec::SmallVec;
use waypoint_app::ComponentFactory;

/// One element of a match chain.
#[derive(Clone, Debug)]
pub struct RouteMatch {
    id: RouteId,
    path: String,
    params: Params,
    component: Option<ComponentFactory>,
    root_component: Option<ComponentFactory>,
    parent: Option<RouteId>,
}

impl RouteMatch {
    fn ancestor(entry: &IndexedRoute) -> Self {
        Self {
            id: entry.id(),
            path: entry.path().to_string(),
            params: Params::new(),
            component: entry.component().cloned(),
            root_component: entry.root_component().cloned(),
            parent: entry.parent(),
        }
    }

    fn terminal(entry: &IndexedRoute, params: Params) -> Self {
        Self { params, parent: None, ..Self::ancestor(entry) }
    }

    /// Id of the matched table entry.
    #[must_use]
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// Resolved path of the matched entry.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Captured parameters; empty on ancestor elements.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Terminal view factory, if the entry declared one.
    #[must_use]
    pub fn component(&self) -> Option<&ComponentFactory> {
        self.component.as_ref()
    }

    /// Wrapper view factory, if the entry declared one.
    #[must_use]
    pub fn root_component(&self) -> Option<&ComponentFactory> {
        self.root_component.as_ref()
    }

    /// Parent link; always `None` on the terminal element.
    #[must_use]
    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }
}

impl RouteTable {
    /// Matches `path` against the table, first match wins.
    ///
    /// Returns the ancestor chain of the winning entry (root first,
    /// terminal last) or an empty vector when nothing matches. An empty
    /// result is an ordinary outcome, not an error.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Vec<RouteMatch> {
        for entry in self.entries() {
            let Some(pattern) = entry.pattern() else { continue };
            let Some(params) = pattern.matches(path) else { continue };

            let mut chain = Vec::new();
            if let Some(parent) = entry.parent() {
                let mut ancestors: SmallVec<[&IndexedRoute; 4]> = SmallVec::new();
                self.collect_ancestors(parent, &mut ancestors);
                chain.extend(ancestors.iter().rev().map(|entry| RouteMatch::ancestor(entry)));
            }
            chain.push(RouteMatch::terminal(entry, params));
            return chain;
        }
        Vec::new()
    }

    /// Walks parent links child-to-root, pushing each ancestor visited.
    fn collect_ancestors<'a>(
        &'a self,
        id: RouteId,
        out: &mut SmallVec<[&'a IndexedRoute; 4]>,
    ) {
        if let Some(entry) = self.get(id) {
            out.push(entry);
            if let Some(parent) = entry.parent() {
                self.collect_ancestors(parent, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteNode;
    use pretty_assertions::assert_eq;

    fn table(routes: Vec<RouteNode>) -> RouteTable {
        RouteTable::build(&routes).unwrap()
    }

    fn chain_paths(chain: &[RouteMatch]) -> Vec<&str> {
        chain.iter().map(RouteMatch::path).collect()
    }

    #[test]
    fn top_level_match_is_a_single_element_chain() {
        let table = table(vec![RouteNode::leaf("/"), RouteNode::leaf("/about")]);
        let chain = table.match_path("/about");
        assert_eq!(chain_paths(&chain), vec!["/about"]);
        assert_eq!(chain[0].parent(), None);
        assert!(chain[0].params().is_empty());
    }

    #[test]
    fn nested_match_expands_ancestors_root_first() {
        let table = table(vec![RouteNode::prefix(
            "/users",
            vec![RouteNode::prefix("/:id", vec![RouteNode::leaf("/posts")])],
        )]);
        let chain = table.match_path("/users/7/posts");
        assert_eq!(chain_paths(&chain), vec!["/users", "/users/:id", "/users/:id/posts"]);
        assert_eq!(chain[2].params().get("id"), Some("7"));
        assert!(chain[0].params().is_empty());
        assert!(chain[1].params().is_empty());
    }

    #[test]
    fn terminal_parent_link_is_stripped() {
        let table = table(vec![RouteNode::prefix("/docs", vec![RouteNode::leaf("/intro")])]);
        let chain = table.match_path("/docs/intro");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].parent(), None);
        assert_eq!(chain[1].parent(), None);
        assert_eq!(chain[1].id().index(), 1);
    }

    #[test]
    fn ancestor_elements_keep_their_parent_links() {
        let table = table(vec![RouteNode::prefix(
            "/a",
            vec![RouteNode::prefix("/b", vec![RouteNode::leaf("/c")])],
        )]);
        let chain = table.match_path("/a/b/c");
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].parent(), None);
        assert_eq!(chain[1].parent(), Some(chain[0].id()));
        assert_eq!(chain[2].parent(), None);
    }

    #[test]
    fn declaration_order_decides_between_overlapping_routes() {
        let param_first = table(vec![
            RouteNode::prefix("/users", vec![RouteNode::leaf("/:id"), RouteNode::leaf("/new")]),
        ]);
        let chain = param_first.match_path("/users/new");
        assert_eq!(chain.last().unwrap().params().get("id"), Some("new"));

        let literal_first = table(vec![
            RouteNode::prefix("/users", vec![RouteNode::leaf("/new"), RouteNode::leaf("/:id")]),
        ]);
        let chain = literal_first.match_path("/users/new");
        assert!(chain.last().unwrap().params().is_empty());
    }

    #[test]
    fn unmatchable_prefix_entries_are_skipped_but_appear_as_ancestors() {
        let table = table(vec![RouteNode::layout(vec![RouteNode::leaf("/home")])]);
        let chain = table.match_path("/home");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].path(), "");
        assert_eq!(chain[1].path(), "/home");

        assert!(table.match_path("").is_empty());
    }

    #[test]
    fn no_match_returns_an_empty_chain() {
        let table = table(vec![RouteNode::leaf("/")]);
        assert!(table.match_path("/nope").is_empty());
    }

    #[test]
    fn index_route_matches_the_parent_prefix() {
        let table = table(vec![RouteNode::prefix(
            "/users",
            vec![RouteNode::index(), RouteNode::leaf("/:id")],
        )]);
        let chain = table.match_path("/users");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].id().index(), 1);
        assert_eq!(chain[1].path(), "/users");
    }

    #[test]
    fn matching_is_deterministic() {
        let table = table(vec![
            RouteNode::leaf("/"),
            RouteNode::prefix("/users", vec![RouteNode::leaf("/:id")]),
        ]);
        let a = table.match_path("/users/9");
        let b = table.match_path("/users/9");
        let ids = |chain: &[RouteMatch]| chain.iter().map(|m| m.id().index()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.last().unwrap().params(), b.last().unwrap().params());
    }
}
