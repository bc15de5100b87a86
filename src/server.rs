//! HTTP server and graceful shutdown.
//!
//! Every accepted connection runs on its own tokio task, and hyper may run
//! several requests of one HTTP/2 connection at once. Handlers and
//! middleware therefore see fully concurrent, unordered calls.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Asks every open connection to finish its current request and close.
//!    Idle keep-alive connections close right away.
//! 3. Waits up to 30 s for them, aborts whatever is left, and returns from
//!    [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds the listening socket.
    ///
    /// Failing here (address in use, permission denied) is fatal for the
    /// caller; nothing is retried.
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), strata::Error> {
    /// use strata::Server;
    /// let server = Server::bind("127.0.0.1:8080".parse()?).await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// The address actually bound. Useful after binding port `0`.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections and dispatches them through `router` until SIGTERM
    /// or Ctrl-C, then drains in-flight connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Self::serve), but stops when `signal` resolves.
    ///
    /// Returns `Err` if accepting fails with an error that retrying cannot
    /// fix. Open connections are drained first either way.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let addr = self.local_addr()?;
        let router = Arc::new(router);

        info!(%addr, "strata listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        // Tells every watched connection to finish its current request and
        // close, including idle keep-alive ones.
        let graceful = GracefulShutdown::new();
        let mut tasks = tokio::task::JoinSet::new();
        let mut backoff = Backoff::default();

        tokio::pin!(signal);

        let outcome = loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break Ok(());
                }

                res = self.listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => {
                            backoff.reset();
                            v
                        }
                        Err(e) if is_transient(&e) => {
                            let delay = backoff.next_delay();
                            warn!(?delay, "accept error: {e}; retrying");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        Err(e) => {
                            error!("accept failed: {e}");
                            break Err(Error::Io(e));
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(router, req).await }
                    });

                    // HTTP/1.1 or HTTP/2, whatever the client speaks.
                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        };

        tokio::select! {
            () = graceful.shutdown() => {}
            () = tokio::time::sleep(DRAIN_TIMEOUT) => {
                warn!(in_flight = tasks.len(), "drain timed out, aborting connections");
                tasks.abort_all();
            }
        }
        while tasks.join_next().await.is_some() {}

        info!("strata stopped");
        outcome
    }
}

// ── Accept errors ─────────────────────────────────────────────────────────────

/// How long open connections get to finish once shutdown starts.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

const MIN_ACCEPT_DELAY: Duration = Duration::from_millis(5);
const MAX_ACCEPT_DELAY: Duration = Duration::from_secs(1);

/// Errors that concern one connection, or a resource shortage (open files,
/// memory) that may clear up. Anything else means the listener is broken.
fn is_transient(e: &io::Error) -> bool {
    use io::ErrorKind::*;

    if matches!(
        e.kind(),
        ConnectionAborted | ConnectionReset | ConnectionRefused | Interrupted | WouldBlock
            | TimedOut | OutOfMemory
    ) {
        return true;
    }

    // ENFILE and EMFILE share these numbers on Linux and the BSDs.
    #[cfg(unix)]
    if matches!(e.raw_os_error(), Some(23 | 24)) {
        return true;
    }

    false
}

/// Doubling delay between failed accepts, capped at [`MAX_ACCEPT_DELAY`].
#[derive(Debug, Default)]
struct Backoff {
    current: Option<Duration>,
}

impl Backoff {
    fn next_delay(&mut self) -> Duration {
        let delay = match self.current {
            None => MIN_ACCEPT_DELAY,
            Some(d) => (d * 2).min(MAX_ACCEPT_DELAY),
        };
        self.current = Some(delay);
        delay
    }

    fn reset(&mut self) {
        self.current = None;
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Every failure becomes a response, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let Some(handler) = router.lookup(req.uri().path()) else {
        return Ok(not_found().into_inner());
    };

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(uri = %parts.uri, "failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let response = handler.handle(Request::new(parts.method, parts.uri, body)).await;
    Ok(response.into_inner())
}

fn not_found() -> Response {
    Response::text("404 page not found\n").with_status(StatusCode::NOT_FOUND)
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C) the process receives.
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
