//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C (or the custom signal passed to
//! [`Server::serve_with_shutdown`]) the server:
//! 1. Stops `listener.accept()` immediately, so no new connections are made.
//! 2. Tells every open connection to finish its in-flight request and close.
//! 3. Waits up to the drain timeout for that, then aborts what is left.
//! 4. Returns from `serve`, which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

enum Listener {
    Addr(SocketAddr),
    Bound(TcpListener),
}

/// The HTTP server.
pub struct Server {
    listener: Listener,
    drain_timeout: Duration,
}

impl Server {
    /// Configures the server to bind to `addr` when it starts serving.
    ///
    /// ```rust
    /// use posta::Server;
    /// let server = Server::bind("0.0.0.0:8080").unwrap();
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr: SocketAddr = addr.parse().map_err(|_| Error::Addr(addr.to_owned()))?;
        Ok(Self { listener: Listener::Addr(addr), drain_timeout: DEFAULT_DRAIN_TIMEOUT })
    }

    /// Serves on an already bound listener (e.g. `127.0.0.1:0` in tests).
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listener: Listener::Bound(listener), drain_timeout: DEFAULT_DRAIN_TIMEOUT }
    }

    /// How long shutdown waits for open connections before aborting them.
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Serves until SIGTERM or Ctrl-C, then shuts down gracefully.
    pub async fn serve<S>(self, dispatcher: Dispatcher<S>) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.serve_with_shutdown(dispatcher, shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then shuts down gracefully.
    pub async fn serve_with_shutdown<S, F>(self, dispatcher: Dispatcher<S>, signal: F) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
        F: Future<Output = ()>,
    {
        let Self { listener, drain_timeout } = self;
        let listener = match listener {
            Listener::Addr(addr) => TcpListener::bind(addr).await?,
            Listener::Bound(l) => l,
        };

        info!(addr = %listener.local_addr()?, "posta listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let dispatcher = dispatcher.clone();
                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let dispatcher = dispatcher.clone();
                        async move { Ok::<_, Infallible>(handle(dispatcher, req).await) }
                    });

                    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), svc);
                    let conn = graceful.watch(conn.into_owned());

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
        }

        drop(listener);

        tokio::select! {
            () = graceful.shutdown() => {}
            () = tokio::time::sleep(drain_timeout) => {
                warn!(remaining = tasks.len(), "drain timeout elapsed, aborting connections");
                tasks.abort_all();
            }
        }
        while tasks.join_next().await.is_some() {}

        info!("posta stopped");
        Ok(())
    }
}

// ── Request handling ──────────────────────────────────────────────────────────

/// Buffers one hyper request and hands it to the dispatcher. Errors never
/// reach hyper: a body that cannot be read is answered `400`.
async fn handle<S>(dispatcher: Dispatcher<S>, req: hyper::Request<Incoming>) -> http::Response<Full<Bytes>>
where
    S: Clone + Send + Sync + 'static,
{
    let response = match Request::from_hyper(req).await {
        Ok(req) => dispatcher.dispatch(req).await,
        Err(e) => {
            warn!("failed to read request body: {e}");
            Response::status(Status::BadRequest)
        }
    };
    response.into_inner()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available. A handler that cannot be installed
/// is logged and that arm never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    // `pending()` never resolves, so the SIGTERM arm is disabled off Unix.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
