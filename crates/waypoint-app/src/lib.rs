#![forbid(unsafe_code)]

//! Component and application-shell contracts.
//!
//! The router resolves route components and hands the composed result to
//! an application shell for mounting; this crate defines both sides of
//! that handshake:
//!
//! - [`Component`]: a renderable unit producing markup, with optional
//!   injected children.
//! - [`ComponentFactory`]: a cloneable, lazily-invoked, possibly
//!   asynchronous and fallible producer of components.
//! - [`AppShell`]: the mount collaborator (root, mount, unmount, lifecycle
//!   hooks, lazy toggle).
//! - [`MemoryShell`]: a deterministic, host-driven shell implementation
//!   for native targets and tests.
//!
//! Everything here assumes a single logical execution context: shell
//! methods take `&self` and implementations use interior mutability.

pub mod component;
pub mod shell;

pub use component::{Component, ComponentError, ComponentFactory, ComponentFuture, Html};
pub use shell::{AppShell, MemoryShell, RootView, ShellEvent, ShellHook, ShellOp};
