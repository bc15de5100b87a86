use std::sync::Arc;

use tracing::info;

use crate::counter::RequestCounter;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;

/// Counts requests that made it all the way through the wrapped handler.
///
/// The increment happens after the wrapped handler's future completes. A
/// handler that panics never reaches it.
#[derive(Clone, Debug)]
pub struct CountRequests {
    counter: Arc<RequestCounter>,
}

impl CountRequests {
    pub fn new(counter: Arc<RequestCounter>) -> Self {
        Self { counter }
    }
}

impl Middleware for CountRequests {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(Counted { next, counter: Arc::clone(&self.counter) })
    }
}

struct Counted {
    next: BoxedHandler,
    counter: Arc<RequestCounter>,
}

impl Handler for Counted {
    fn handle(&self, req: Request) -> BoxFuture {
        let next = Arc::clone(&self.next);
        let counter = Arc::clone(&self.counter);
        Box::pin(async move {
            let res = next.handle(req).await;
            counter.increment();
            info!("COUNTER >> Counted");
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::{Method, Uri};

    use super::*;
    use crate::handler::{boxed, handler_fn};
    use crate::middleware::{Chain, Logger};
    use crate::response::Response;

    fn get() -> Request {
        Request::new(Method::GET, Uri::from_static("/greet"), Bytes::new())
    }

    #[tokio::test]
    async fn counts_after_the_handler_finishes() {
        let counter = Arc::new(RequestCounter::new());
        let seen = Arc::clone(&counter);

        // The handler observes the counter while it runs.
        let h = CountRequests::new(Arc::clone(&counter)).wrap(boxed(handler_fn(move |_req| {
            let during = seen.read();
            async move { Response::text(during.to_string()) }
        })));

        assert_eq!(h.handle(get()).await.body(), b"0");
        assert_eq!(counter.read(), 1);
        assert_eq!(h.handle(get()).await.body(), b"1");
        assert_eq!(counter.read(), 2);
    }

    #[tokio::test]
    async fn a_panicking_handler_is_not_counted() {
        let counter = Arc::new(RequestCounter::new());
        let h = CountRequests::new(Arc::clone(&counter)).wrap(boxed(handler_fn(|_req| async {
            if true {
                panic!("handler blew up");
            }
            Response::text("unreachable")
        })));

        let joined = tokio::spawn(async move { h.handle(get()).await }).await;

        assert!(joined.unwrap_err().is_panic());
        assert_eq!(counter.read(), 0);
    }

    #[tokio::test]
    async fn nesting_and_chaining_count_the_same() {
        let nested_counter = Arc::new(RequestCounter::new());
        let chained_counter = Arc::new(RequestCounter::new());
        let greet = || handler_fn(|_req| async { "hello\n" });

        let nested = Logger.wrap(CountRequests::new(Arc::clone(&nested_counter)).wrap(boxed(greet())));
        let chained = Chain::new()
            .with(CountRequests::new(Arc::clone(&chained_counter)))
            .with(Logger)
            .apply(greet());

        for _ in 0..5 {
            let a = nested.handle(get()).await;
            let b = chained.handle(get()).await;
            assert_eq!(a.body(), b.body());
            assert_eq!(a.status_code(), b.status_code());
        }
        assert_eq!(nested_counter.read(), 5);
        assert_eq!(chained_counter.read(), 5);
    }
}
