use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use strata::{RequestCounter, Server, app};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

struct Running {
    addr: SocketAddr,
    counter: Arc<RequestCounter>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), strata::Error>>,
}

async fn start() -> Running {
    let counter = Arc::new(RequestCounter::new());
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let router = app::router(Arc::clone(&counter));
    let task = tokio::spawn(server.serve_with_shutdown(router, async move {
        let _ = stopped.await;
    }));

    Running { addr, counter, stop, task }
}

impl Running {
    async fn shutdown(self) {
        self.stop.send(()).unwrap();
        self.task.await.unwrap().unwrap();
    }
}

/// Sends one HTTP/1.1 request and returns `(status line, body)`.
async fn get(addr: SocketAddr, path: &str) -> (String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").expect("complete response");
    let status_line = head.lines().next().unwrap().to_owned();
    (status_line, body.to_owned())
}

#[tokio::test]
async fn greet_then_status() {
    let server = start().await;

    let (status, body) = get(server.addr, "/greet").await;
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, "hello\n");

    let (status, body) = get(server.addr, "/status").await;
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, "Requests Served: 1\n");

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = start().await;

    let (status, body) = get(server.addr, "/nope").await;
    assert_eq!(status, "HTTP/1.1 404 Not Found");
    assert_eq!(body, "404 page not found\n");
    assert_eq!(server.counter.read(), 0);

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_greets_are_all_counted() {
    let server = start().await;
    let addr = server.addr;

    let clients: Vec<_> = (0..50).map(|_| tokio::spawn(get(addr, "/greet"))).collect();
    for client in clients {
        let (_, body) = client.await.unwrap();
        assert_eq!(body, "hello\n");
    }

    let (_, body) = get(addr, "/status").await;
    assert_eq!(body, "Requests Served: 50\n");
    assert_eq!(server.counter.read(), 50);

    server.shutdown().await;
}

#[tokio::test]
async fn bind_fails_when_the_port_is_taken() {
    let first = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = first.local_addr().unwrap();

    let err = Server::bind(addr).await.err().expect("second bind must fail");
    assert!(matches!(err, strata::Error::Io(_)));
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let server = start().await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /greet HTTP/1.1\r\nhost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut buf = [0u8; 512];
    let n = stream.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).starts_with("HTTP/1.1 200 OK"));

    // The connection stays open and idle while the server shuts down.
    timeout(Duration::from_secs(3), server.shutdown())
        .await
        .expect("serve returns with a keep-alive connection open");

    let mut rest = Vec::new();
    timeout(Duration::from_secs(1), stream.read_to_end(&mut rest))
        .await
        .expect("server closed the connection")
        .unwrap();
}
