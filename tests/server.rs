use std::net::SocketAddr;
use std::time::Duration;

use posta::{AppContext, Server, app};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), posta::Error>>,
}

async fn start() -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(
        Server::from_listener(listener)
            .drain_timeout(Duration::from_secs(5))
            .serve_with_shutdown(app::dispatcher(AppContext::default()), async {
                let _ = stopped.await;
            }),
    );
    Running { addr, stop, handle }
}

/// Sends one HTTP/1.1 request with `Connection: close` and returns
/// `(status, body)`.
async fn send(addr: SocketAddr, method: &str, path: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    (status, body.to_owned())
}

#[tokio::test]
async fn crud_over_tcp() {
    let server = start().await;

    let (status, body) = send(server.addr, "GET", "/api/posts", "").await;
    assert_eq!((status, body.as_str()), (200, "[]"));

    let (status, body) = send(server.addr, "POST", "/api/posts", r#"{"id":0,"content":"hi"}"#).await;
    assert_eq!((status, body.as_str()), (201, r#"{"id":1,"content":"hi"}"#));

    let (status, body) = send(server.addr, "GET", "/api/posts/1", "").await;
    assert_eq!((status, body.as_str()), (200, r#"{"id":1,"content":"hi"}"#));

    let (status, body) = send(server.addr, "DELETE", "/api/posts/1", "").await;
    assert_eq!((status, body.as_str()), (204, ""));

    let (status, body) = send(server.addr, "GET", "/api/posts/1", "").await;
    assert_eq!((status, body.as_str()), (404, ""));

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn malformed_body_is_500_and_server_keeps_serving() {
    let server = start().await;

    let (status, _) = send(server.addr, "POST", "/api/posts", "{oops").await;
    assert_eq!(status, 500);

    let (status, _) = send(server.addr, "GET", "/api/posts", "").await;
    assert_eq!(status, 200);

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn stops_accepting_after_shutdown() {
    let server = start().await;
    let addr = server.addr;

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
