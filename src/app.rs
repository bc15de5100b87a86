//! The demo application: a greeting endpoint and a status endpoint sharing
//! one request counter.
//!
//! | Path | Stack (outermost first) | Body |
//! |---|---|---|
//! | `/greet` | `Logger` → `CountRequests` → `greet` | `hello` |
//! | `/status` | `Logger` → `Status` | `Requests Served: <n>` |

use std::sync::Arc;

use tracing::info;

use crate::counter::RequestCounter;
use crate::handler::{BoxFuture, Handler, handler_fn};
use crate::middleware::{Chain, CountRequests, Logger};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Builds the router with both endpoints registered.
pub fn router(counter: Arc<RequestCounter>) -> Router {
    let greet_stack = Chain::new()
        .with(CountRequests::new(Arc::clone(&counter)))
        .with(Logger);
    let status_stack = Chain::new().with(Logger);

    Router::new()
        .route("/greet", greet_stack.apply(handler_fn(greet)))
        .route("/status", status_stack.apply(Status::new(counter)))
}

pub async fn greet(_req: Request) -> Response {
    let res = Response::text("hello\n");
    info!("GREETED");
    res
}

/// Reports how many requests the counter has seen so far.
pub struct Status {
    counter: Arc<RequestCounter>,
}

impl Status {
    pub fn new(counter: Arc<RequestCounter>) -> Self {
        Self { counter }
    }
}

impl Handler for Status {
    fn handle(&self, _req: Request) -> BoxFuture {
        let counter = Arc::clone(&self.counter);
        Box::pin(async move {
            let res = Response::text(format!("Requests Served: {}\n", counter.read()));
            info!("STATUS PROVIDED");
            res
        })
    }
}
