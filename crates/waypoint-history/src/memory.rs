#![forbid(unsafe_code)]

//! In-memory history backend.
//!
//! Keeps the full entry stack in a `Vec` with a cursor index. Entry keys
//! are assigned from a counter, so two histories constructed the same way
//! and driven with the same operations produce identical locations.
//!
//! # Semantics
//!
//! - `push` truncates everything after the cursor before appending, the
//!   way a browser discards its forward list.
//! - `replace` rewrites the current entry and assigns it a fresh key.
//! - `go` clamps the target index into range; an out-of-range delta lands
//!   on the first or last entry instead of failing. The action becomes
//!   [`Action::Pop`] even for a zero delta.

use crate::{Action, History, Location, To};

/// Deterministic in-memory [`History`].
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Vec<Location>,
    index: usize,
    action: Action,
    next_key: u64,
}

impl MemoryHistory {
    /// A history seeded with a single `/` entry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_entries(vec![To::from("/")], 0)
    }

    /// A history seeded with the given entries, cursor at `initial_index`
    /// (clamped). An empty `entries` falls back to a single `/` entry.
    #[must_use]
    pub fn with_entries(entries: Vec<To>, initial_index: usize) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            index: 0,
            action: Action::Pop,
            next_key: 0,
        };
        let seeds = if entries.is_empty() {
            vec![To::from("/")]
        } else {
            entries
        };
        for to in &seeds {
            let loc = history.location_for(to);
            history.entries.push(loc);
        }
        history.index = initial_index.min(history.entries.len() - 1);
        history
    }

    /// Number of entries on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history keeps at least one entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Current cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    fn location_for(&mut self, to: &To) -> Location {
        let key = format!("k{}", self.next_key);
        self.next_key += 1;
        Location {
            pathname: to.path.pathname.clone(),
            search: to.path.search.clone(),
            hash: to.path.hash.clone(),
            state: to.state.clone(),
            key,
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for MemoryHistory {
    fn action(&self) -> Action {
        self.action
    }

    fn location(&self) -> Location {
        self.entries[self.index].clone()
    }

    fn push(&mut self, to: &To) {
        let loc = self.location_for(to);
        self.index += 1;
        self.entries.truncate(self.index);
        self.entries.push(loc);
        self.action = Action::Push;
    }

    fn replace(&mut self, to: &To) {
        let loc = self.location_for(to);
        self.entries[self.index] = loc;
        self.action = Action::Replace;
    }

    fn go(&mut self, delta: i32) {
        let target = self.index as i64 + i64::from(delta);
        let max = (self.entries.len() - 1) as i64;
        self.index = target.clamp(0, max) as usize;
        self.action = Action::Pop;
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
