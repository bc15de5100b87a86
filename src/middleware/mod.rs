//! Middleware and composition.
//!
//! A [`Middleware`] takes a handler and returns a new handler that runs its
//! own code before and/or after delegating. Two ways to stack them:
//!
//! ```rust
//! use std::sync::Arc;
//! use strata::middleware::{Chain, CountRequests, Logger, Middleware};
//! use strata::{RequestCounter, Request, boxed, handler_fn};
//!
//! async fn greet(_req: Request) -> &'static str { "hello\n" }
//!
//! let counter = Arc::new(RequestCounter::new());
//!
//! // Nested by hand: `Logger` is written first, so it is outermost.
//! let nested = Logger.wrap(CountRequests::new(Arc::clone(&counter)).wrap(boxed(handler_fn(greet))));
//!
//! // The same stack as a list, applied in order: `Logger` comes last, so it is outermost.
//! let chained = Chain::new()
//!     .with(CountRequests::new(counter))
//!     .with(Logger)
//!     .apply(handler_fn(greet));
//! # let _ = (nested, chained);
//! ```
//!
//! For a request the outermost layer's pre-logic runs first and its
//! post-logic runs last.

mod count;
mod logger;

use std::fmt;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler, boxed};

pub use count::CountRequests;
pub use logger::Logger;

/// Turns one handler into another with the same capability.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (**self).wrap(next)
    }
}

/// Returns a [`Middleware`] implemented by a closure.
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    MiddlewareFn { f }
}

/// A [`Middleware`] implemented by a closure. Created by [`middleware_fn`].
#[derive(Clone, Copy)]
pub struct MiddlewareFn<F> {
    f: F,
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (self.f)(next)
    }
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFn")
            .field("f", &format_args!("<{}>", std::any::type_name::<F>()))
            .finish()
    }
}

// ── Composition ───────────────────────────────────────────────────────────────

/// An ordered list of middleware.
///
/// [`apply`](Self::apply) wraps the handler with each entry in list order,
/// so the entry added last ends up outermost. A chain can be applied to any
/// number of handlers.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Appends `middleware`. Returns `self` for chaining.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn apply(&self, handler: impl Handler) -> BoxedHandler {
        self.layers.iter().fold(boxed(handler), |h, m| m.wrap(h))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("layers", &self.layers.len()).finish()
    }
}

/// Wraps `handler` with `middleware` in slice order; the last entry is
/// outermost.
///
/// `compose(h, &[&a, &b])` behaves exactly like `b.wrap(a.wrap(boxed(h)))`.
pub fn compose(handler: impl Handler, middleware: &[&dyn Middleware]) -> BoxedHandler {
    middleware.iter().fold(boxed(handler), |h, m| m.wrap(h))
}
