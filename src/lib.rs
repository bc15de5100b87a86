//! # strata
//!
//! HTTP handlers wrapped in layers of middleware, served by hyper.
//!
//! ## The pieces
//!
//! - [`Handler`] — turns a [`Request`] into a [`Response`]. Plain async
//!   functions become handlers through [`handler_fn`]; structs that carry
//!   state implement the trait themselves.
//! - [`Middleware`](middleware::Middleware) — turns one handler into another,
//!   running code before and after the one it wraps.
//! - [`Chain`](middleware::Chain) — an ordered list of middleware applied to
//!   a handler. The last entry is outermost.
//! - [`Router`] and [`Server`] — map paths to finished handlers and serve
//!   them over HTTP/1.1 and HTTP/2.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strata::middleware::{Chain, CountRequests, Logger};
//! use strata::{Request, RequestCounter, Router, Server, handler_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strata::Error> {
//!     let counter = Arc::new(RequestCounter::new());
//!     let stack = Chain::new().with(CountRequests::new(counter)).with(Logger);
//!
//!     let app = Router::new().route("/greet", stack.apply(handler_fn(greet)));
//!
//!     Server::bind("127.0.0.1:8080".parse()?).await?.serve(app).await
//! }
//!
//! async fn greet(_req: Request) -> &'static str {
//!     "hello\n"
//! }
//! ```

mod config;
mod counter;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod middleware;

pub use config::{ADDR_VAR, Config, DEFAULT_ADDR};
pub use counter::RequestCounter;
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Handler, HandlerFn, boxed, handler_fn};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;
