//! Radix-tree request router.
//!
//! Paths map to handlers, one handler per path, whatever the method.
//! Composition happens before registration: the router stores the finished
//! chain and knows nothing about middleware.

use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler, boxed};

/// The application router.
///
/// O(path-length) lookup via [`matchit`]. Build it once at startup; pass it
/// to [`Server::serve`](crate::Server::serve). Each [`Router::route`] call
/// returns `self` so registrations chain naturally.
pub struct Router {
    routes: MatchitRouter<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: MatchitRouter::new() }
    }

    /// Register `handler` at `path`. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or already registered.
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        self.routes
            .insert(path, boxed(handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// The handler registered for `path`, if any.
    pub fn lookup(&self, path: &str) -> Option<BoxedHandler> {
        let matched = self.routes.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
