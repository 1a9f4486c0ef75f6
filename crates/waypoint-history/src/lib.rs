#![forbid(unsafe_code)]

//! Location model and history contract.
//!
//! A history tracks an ordered stack of visited locations plus a cursor,
//! and reports the kind of the most recent transition. The router core
//! depends only on the [`History`] trait; [`MemoryHistory`] is the
//! deterministic in-memory backend used on native targets and in tests.
//! Browser- and hash-fragment-backed implementations of the same trait
//! belong in platform crates.
//!
//! # Invariants
//!
//! 1. A history always has at least one entry and a valid cursor.
//! 2. `location()` reflects the entry at the cursor; `action()` reflects
//!    the operation that most recently moved or rewrote it.
//! 3. `push` discards any forward entries before appending (no forked
//!    timelines).
//! 4. Entry keys are unique within one history instance.

pub mod memory;

pub use memory::MemoryHistory;

use serde::{Deserialize, Serialize};

// ============================================================================
// Transition kinds
// ============================================================================

/// The kind of the most recent history transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// The cursor moved along existing entries (`go`, back/forward).
    #[default]
    Pop,
    /// A new entry was appended.
    Push,
    /// The current entry was rewritten in place.
    Replace,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Pop => "pop",
            Action::Push => "push",
            Action::Replace => "replace",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Path / Location / To
// ============================================================================

/// The pieces of a URL that matter to in-app navigation.
///
/// `search` includes its leading `?` and `hash` its leading `#` whenever
/// they are non-empty, mirroring the DOM location convention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Default for Path {
    fn default() -> Self {
        Self {
            pathname: "/".to_string(),
            search: String::new(),
            hash: String::new(),
        }
    }
}

impl Path {
    /// A path with the given pathname and empty search/hash.
    #[must_use]
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Self::default()
        }
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&create_path(self))
    }
}

/// Split a concatenated URL string into its [`Path`] pieces.
///
/// The hash fragment is carved off first, then the search string, so a
/// `?` inside the fragment stays in the fragment. An empty input yields
/// an empty pathname (not `/`); callers decide how to default it.
#[must_use]
pub fn parse_path(value: &str) -> Path {
    let mut pathname = value;
    let mut search = String::new();
    let mut hash = String::new();

    if let Some(idx) = pathname.find('#') {
        hash = pathname[idx..].to_string();
        pathname = &pathname[..idx];
    }
    if let Some(idx) = pathname.find('?') {
        search = pathname[idx..].to_string();
        pathname = &pathname[..idx];
    }

    Path {
        pathname: pathname.to_string(),
        search,
        hash,
    }
}

/// Join [`Path`] pieces back into one URL string.
///
/// Missing `?`/`#` prefixes are supplied; a bare `?` or `#` is treated as
/// empty.
#[must_use]
pub fn create_path(path: &Path) -> String {
    let mut out = path.pathname.clone();
    if !path.search.is_empty() && path.search != "?" {
        if !path.search.starts_with('?') {
            out.push('?');
        }
        out.push_str(&path.search);
    }
    if !path.hash.is_empty() && path.hash != "#" {
        if !path.hash.starts_with('#') {
            out.push('#');
        }
        out.push_str(&path.hash);
    }
    out
}

/// An entry in the history stack: a [`Path`] plus the state value stored
/// alongside it and a key identifying this particular entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    pub search: String,
    pub hash: String,
    /// Arbitrary JSON state attached at push/replace time.
    pub state: Option<serde_json::Value>,
    /// Unique (per history instance) entry key.
    pub key: String,
}

impl Location {
    /// The path pieces of this location.
    #[must_use]
    pub fn path(&self) -> Path {
        Path {
            pathname: self.pathname.clone(),
            search: self.search.clone(),
            hash: self.hash.clone(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&create_path(&self.path()))
    }
}

/// A navigation destination: where to go and what state to store there.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct To {
    pub path: Path,
    pub state: Option<serde_json::Value>,
}

impl To {
    /// Destination for the given path, no state.
    #[must_use]
    pub fn new(path: Path) -> Self {
        Self { path, state: None }
    }

    /// Attach a state value to this destination.
    #[must_use]
    pub fn with_state(mut self, state: serde_json::Value) -> Self {
        self.state = Some(state);
        self
    }
}

impl From<Path> for To {
    fn from(path: Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for To {
    fn from(value: &str) -> Self {
        Self::new(parse_path(value))
    }
}

impl From<String> for To {
    fn from(value: String) -> Self {
        Self::new(parse_path(&value))
    }
}

// ============================================================================
// History contract
// ============================================================================

/// The history collaborator contract.
///
/// Implementations own the entry stack; the router owns the
/// implementation and is the only caller, so all mutation happens on one
/// logical execution context.
pub trait History {
    /// Kind of the most recent transition.
    fn action(&self) -> Action;

    /// The entry at the cursor.
    fn location(&self) -> Location;

    /// Discard forward entries, append `to`, move the cursor onto it.
    fn push(&mut self, to: &To);

    /// Rewrite the entry at the cursor with `to` (fresh key).
    fn replace(&mut self, to: &To);

    /// Move the cursor by `delta` entries, clamped to the stack bounds.
    fn go(&mut self, delta: i32);
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_plain_pathname() {
        let p = parse_path("/users/42");
        assert_eq!(p.pathname, "/users/42");
        assert_eq!(p.search, "");
        assert_eq!(p.hash, "");
    }

    #[test]
    fn parse_search_and_hash() {
        let p = parse_path("/docs?page=2#intro");
        assert_eq!(p.pathname, "/docs");
        assert_eq!(p.search, "?page=2");
        assert_eq!(p.hash, "#intro");
    }

    #[test]
    fn parse_question_mark_inside_hash() {
        let p = parse_path("/docs#what?");
        assert_eq!(p.pathname, "/docs");
        assert_eq!(p.search, "");
        assert_eq!(p.hash, "#what?");
    }

    #[test]
    fn parse_empty_input() {
        let p = parse_path("");
        assert_eq!(p.pathname, "");
        assert_eq!(p.search, "");
        assert_eq!(p.hash, "");
    }

    #[test]
    fn create_supplies_missing_prefixes() {
        let path = Path {
            pathname: "/a".into(),
            search: "q=1".into(),
            hash: "top".into(),
        };
        assert_eq!(create_path(&path), "/a?q=1#top");
    }

    #[test]
    fn create_ignores_bare_markers() {
        let path = Path {
            pathname: "/a".into(),
            search: "?".into(),
            hash: "#".into(),
        };
        assert_eq!(create_path(&path), "/a");
    }

    #[test]
    fn create_round_trips_parse() {
        let raw = "/x/y?k=v&n=2#frag";
        assert_eq!(create_path(&parse_path(raw)), raw);
    }

    #[test]
    fn to_from_str_parses() {
        let to = To::from("/a?b#c");
        assert_eq!(to.path.pathname, "/a");
        assert_eq!(to.path.search, "?b");
        assert_eq!(to.path.hash, "#c");
        assert_eq!(to.state, None);
    }

    #[test]
    fn to_with_state() {
        let to = To::from("/a").with_state(serde_json::json!({"from": "test"}));
        assert!(to.state.is_some());
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Pop.to_string(), "pop");
        assert_eq!(Action::Push.to_string(), "push");
        assert_eq!(Action::Replace.to_string(), "replace");
    }
}
