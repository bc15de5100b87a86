use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;

/// Logs every request on the way in and on the way out, with the time spent
/// in the wrapped handler.
///
/// ```text
/// LOGGER >> START GET "/greet"
/// LOGGER END GET "/greet" (41.2µs)
/// ```
///
/// The exit line also carries the duration as an `elapsed_us` field.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger;

impl Middleware for Logger {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(Logged { next })
    }
}

struct Logged {
    next: BoxedHandler,
}

impl Handler for Logged {
    fn handle(&self, req: Request) -> BoxFuture {
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            let method = req.method().clone();
            let uri = req.uri().to_string();

            info!("LOGGER >> START {method} {uri:?}");
            let start = Instant::now();
            let res = next.handle(req).await;
            let elapsed = start.elapsed();
            info!(elapsed_us = micros(elapsed), "LOGGER END {method} {uri:?} ({elapsed:?})");

            res
        })
    }
}

/// Whole microseconds in `d`, saturating at `u64::MAX`.
fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
