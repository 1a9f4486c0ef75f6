#![forbid(unsafe_code)]

//! Path parameters extracted by a successful pattern match.
//!
//! Stored in a `BTreeMap` so iteration order is stable regardless of the
//! order segments appeared in the pattern. Route patterns carry a handful
//! of parameters at most, so the tree's log factor is irrelevant and the
//! deterministic ordering pays for itself in tests and logs.

use std::collections::BTreeMap;

/// Named path parameters captured while matching a concrete path.
///
/// Keys are the parameter names from the pattern (without the leading `:`),
/// values are the percent-decoded segment text. The anonymous catch-all
/// stores its remainder under the key `"*"`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: String, value: String) {
        self.values.insert(name, value);
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no parameters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates parameters in lexicographic name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
