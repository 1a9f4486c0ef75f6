#![forbid(unsafe_code)]

//! Client-side routing for Waypoint applications.
//!
//! A declarative tree of [`RouteNode`]s flattens into a validated
//! [`RouteTable`]; concrete pathnames match against the table first-match
//! wins and expand into an ancestor chain; a [`Router`] ties the table to
//! a history backend and an application shell, resolving and mounting
//! route components asynchronously as navigation happens.
//!
//! The crate is single-threaded by design. State lives behind `Rc` and
//! interior mutability, matching the browser-like host model it targets;
//! collaborators (history, shell, link host) are traits with deterministic
//! in-memory implementations for native use and tests.
//!
//! ```
//! use waypoint_router::{MemoryHistory, RouteNode, Router, RouterOptions};
//!
//! let routes = vec![
//!     RouteNode::leaf("/"),
//!     RouteNode::prefix("/users", vec![RouteNode::index(), RouteNode::leaf("/:id")]),
//! ];
//! let router = Router::new(RouterOptions::new(routes, Box::new(MemoryHistory::new()))).unwrap();
//!
//! router.navigate("/users/42");
//! let chain = router.state().matches.unwrap();
//! assert_eq!(chain.last().unwrap().params().get("id"), Some("42"));
//! ```

pub mod error;
pub mod link;
pub mod matcher;
pub mod params;
pub mod pattern;
pub mod route;
pub mod router;
pub mod state;
pub mod table;
pub mod task;

pub use error::{PatternError, Result, RouterError};
pub use link::{Anchor, AnchorId, LinkHook, LinkHost, LinkInterceptor, MemoryDom};
pub use matcher::RouteMatch;
pub use params::Params;
pub use pattern::PathPattern;
pub use route::{RouteKind, RouteNode};
pub use router::{NavigationTarget, Router, RouterOptions};
pub use state::{RouterState, Subscription};
pub use table::{IndexedRoute, RouteId, RouteTable};
pub use task::{LocalExecutor, Spawn};

// Collaborator crates re-exported so applications depend on one crate.
pub use waypoint_app::{
    AppShell, Component, ComponentError, ComponentFactory, ComponentFuture, Html, MemoryShell,
    RootView, ShellEvent, ShellHook, ShellOp,
};
pub use waypoint_history::{
    Action, History, Location, MemoryHistory, Path, To, create_path, parse_path,
};
