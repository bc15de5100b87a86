//! The [`Handler`] capability and its two flavours.
//!
//! Everything that turns a [`Request`] into a [`Response`] is a `Handler`:
//! the plain functions at the end of a chain, stateful structs, and the
//! wrappers that middleware produces. The router and the middleware only
//! ever see the trait.
//!
//! ```text
//! async fn greet(req: Request) -> Response { … }    ← function-backed
//!        ↓ handler_fn(greet)
//! HandlerFn(greet)                                  ← implements Handler
//!
//! struct Status { counter: Arc<RequestCounter> }    ← struct-backed
//! impl Handler for Status { … }                     ← implements Handler
//!
//!        ↓ boxed(…)
//! Arc<dyn Handler>                                  ← what gets stored
//! ```
//!
//! Per request the cost is one `Arc` clone and one virtual call per layer.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` so tokio can move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// Processes one request and produces one response.
///
/// Implement it on a struct when the handler carries state:
///
/// ```rust
/// use strata::{BoxFuture, Handler, Request, Response};
///
/// struct Fixed(&'static str);
///
/// impl Handler for Fixed {
///     fn handle(&self, _req: Request) -> BoxFuture {
///         let body = self.0;
///         Box::pin(async move { Response::text(body) })
///     }
/// }
/// ```
///
/// For plain functions and closures use [`handler_fn`].
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: Request) -> BoxFuture;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(&self, req: Request) -> BoxFuture {
        (**self).handle(req)
    }
}

/// Type-erases `handler` so it can sit next to handlers of other types.
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    Arc::new(handler)
}

// ── Function-backed handlers ──────────────────────────────────────────────────

/// Adapts an async function or closure into a [`Handler`].
///
/// Accepts anything shaped like:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    HandlerFn(f)
}

/// A [`Handler`] backed by a function. Created by [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(F);

impl<F, Fut, R> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn handle(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerFn")
            .field(&format_args!("<{}>", std::any::type_name::<F>()))
            .finish()
    }
}
