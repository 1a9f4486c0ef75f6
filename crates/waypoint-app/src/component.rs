#![forbid(unsafe_code)]

//! Renderable components and their factories.
//!
//! A [`Component`] turns itself (plus optional injected children) into
//! [`Html`]. Routes do not hold components directly; they hold
//! [`ComponentFactory`] handles, invoked once per presentation so that a
//! factory may construct fresh state, load lazily, or fail. Resolution is
//! asynchronous: every factory returns a [`ComponentFuture`], with
//! synchronous construction wrapped in an already-ready future.
//!
//! # Invariants
//!
//! 1. Cloning a factory clones the handle, not the producer: all clones
//!    invoke the same closure.
//! 2. `resolve()` never panics; failures travel as [`ComponentError`].
//! 3. Rendering is pure from the caller's perspective: the router calls
//!    `render` exactly once per presentation per component.

use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use thiserror::Error;

// ============================================================================
// Markup
// ============================================================================

/// Rendered markup.
///
/// A thin newtype over `String`; the router and shells pass it through
/// without inspecting it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Html {
    fn from(markup: String) -> Self {
        Self(markup)
    }
}

impl From<&str> for Html {
    fn from(markup: &str) -> Self {
        Self(markup.to_string())
    }
}

impl std::fmt::Display for Html {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Components
// ============================================================================

/// A renderable unit.
///
/// `children` carries the composed output of inner routes when this
/// component acts as a layout; leaf components may ignore it.
pub trait Component {
    fn render(&self, children: Option<&Html>) -> Html;
}

/// Component resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The factory failed to produce a component.
    #[error("failed to load component {component}: {detail}")]
    Load { component: String, detail: String },

    /// Resolution was abandoned by the host before completing.
    #[error("component load canceled: {component}")]
    Canceled { component: String },
}

/// Future yielded by a factory invocation.
pub type ComponentFuture = LocalBoxFuture<'static, Result<Rc<dyn Component>, ComponentError>>;

/// Cloneable handle to a component producer.
///
/// Invoking the factory starts a fresh resolution; nothing is cached
/// here. Caching, when wanted, belongs in the closure.
#[derive(Clone)]
pub struct ComponentFactory {
    make: Rc<dyn Fn() -> ComponentFuture>,
}

impl ComponentFactory {
    /// Factory around a synchronous constructor.
    pub fn new<C, F>(make: F) -> Self
    where
        C: Component + 'static,
        F: Fn() -> C + 'static,
    {
        Self {
            make: Rc::new(move || {
                let component: Rc<dyn Component> = Rc::new(make());
                futures::future::ready(Ok(component)).boxed_local()
            }),
        }
    }

    /// Factory that always hands out the same shared instance.
    pub fn shared(component: Rc<dyn Component>) -> Self {
        Self {
            make: Rc::new(move || {
                let component = Rc::clone(&component);
                futures::future::ready(Ok(component)).boxed_local()
            }),
        }
    }

    /// Factory around an asynchronous, fallible constructor.
    pub fn from_future<F, Fut>(make: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<Rc<dyn Component>, ComponentError>> + 'static,
    {
        Self {
            make: Rc::new(move || make().boxed_local()),
        }
    }

    /// Factory that always fails with [`ComponentError::Load`].
    ///
    /// Useful as a placeholder and in failure-policy tests.
    pub fn failing(component: impl Into<String>, detail: impl Into<String>) -> Self {
        let component = component.into();
        let detail = detail.into();
        Self {
            make: Rc::new(move || {
                let err = ComponentError::Load {
                    component: component.clone(),
                    detail: detail.clone(),
                };
                futures::future::ready(Err(err)).boxed_local()
            }),
        }
    }

    /// Start one resolution.
    #[must_use]
    pub fn resolve(&self) -> ComponentFuture {
        (self.make)()
    }
}

impl std::fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentFactory").finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
