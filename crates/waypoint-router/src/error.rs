#![forbid(unsafe_code)]

//! Error types for route-table construction and router lifecycle.
//!
//! Everything that can go wrong while building a [`crate::RouteTable`] or
//! installing a [`crate::Router`] funnels into [`RouterError`]. Pattern
//! compilation has its own [`PatternError`] because callers that only
//! compile patterns (no router involved) should not see lifecycle variants.

use thiserror::Error;
use waypoint_app::ComponentError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Failure while compiling a route path into a [`crate::PathPattern`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A `:` segment with no name, e.g. `/users/:`.
    #[error("empty parameter name in pattern {pattern:?}")]
    EmptyParamName {
        /// The offending pattern, verbatim.
        pattern: String,
    },

    /// A parameter name containing a character outside `[A-Za-z0-9_]`.
    #[error("invalid character {found:?} in parameter name of pattern {pattern:?}")]
    InvalidParamChar {
        /// The offending pattern, verbatim.
        pattern: String,
        /// The first rejected character.
        found: char,
    },

    /// The same parameter name appears twice in one pattern.
    #[error("duplicate parameter name {name:?} in pattern {pattern:?}")]
    DuplicateParam {
        /// The offending pattern, verbatim.
        pattern: String,
        /// The repeated name.
        name: String,
    },

    /// A catch-all segment (`*` or `*rest`) that is not the final segment.
    #[error("catch-all segment must be last in pattern {pattern:?}")]
    CatchAllNotLast {
        /// The offending pattern, verbatim.
        pattern: String,
    },
}

/// Top-level error for table construction and router lifecycle.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The flattened route table violated a structural invariant.
    #[error("invalid route table: {detail}")]
    InvalidTable {
        /// Human-readable description of the violated invariant.
        detail: String,
    },

    /// A route path failed to compile into a matchable pattern.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// [`crate::Router::install`] was called without a configured link host.
    #[error("link interception requires a link host; none was configured")]
    LinkHostMissing,

    /// A component factory failed while resolving a view.
    #[error(transparent)]
    Resolve(#[from] ComponentError),
}
