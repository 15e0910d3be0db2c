//! Request dispatch.
//!
//! Per request: `Received → Resolved → {Handled, NotFound, Failed}`.
//!
//! - **Resolved** looks the `(method, path)` pair up in the [`Router`].
//! - **NotFound** answers `404` with an empty body. An unknown method is a
//!   route miss like any other.
//! - **Handled** returns whatever the handler built, unchanged.
//! - **Failed** covers a handler returning `Err` *and* a handler panicking.
//!   The failure is logged and the client gets a bare `500`; nothing is
//!   propagated to the server loop.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug, error, info, info_span};

use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Routes requests through a read-only [`Router`] with a shared context.
///
/// Cloning is cheap: the route table sits behind an `Arc` and the context is
/// expected to be cheap to clone.
pub struct Dispatcher<S> {
    router: Arc<Router<S>>,
    state: S,
}

impl<S: Clone> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self { router: Arc::clone(&self.router), state: self.state.clone() }
    }
}

impl<S> Dispatcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(router: Router<S>, state: S) -> Self {
        Self { router: Arc::new(router), state }
    }

    pub fn state(&self) -> &S { &self.state }

    /// Routes one request and produces one response. Never fails.
    pub async fn dispatch(&self, req: Request) -> Response {
        let span = info_span!("request", method = %req.method, path = %req.path);
        let started = Instant::now();

        let response = self.resolve_and_call(req).instrument(span.clone()).await;

        span.in_scope(|| {
            info!(
                status = response.status_code().as_u16(),
                latency_us = started.elapsed().as_micros() as u64,
                "request completed",
            );
        });
        response
    }

    async fn resolve_and_call(&self, req: Request) -> Response {
        let handler = req.method
            .parse::<Method>()
            .ok()
            .and_then(|method| self.router.get_handler(method, &req.path));

        let Some(handler) = handler else {
            debug!("no route");
            return Response::status(Status::NotFound);
        };

        // Own task so a panicking handler is caught as a `JoinError`.
        let fut = handler.call(req, self.state.clone());
        match tokio::spawn(fut.in_current_span()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(error = %e, "handler failed");
                Response::status(Status::InternalServerError)
            }
            Err(e) => {
                error!(error = %e, "handler panicked");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    async fn ok(_: Request, _: ()) -> Result<Response, Error> {
        Ok(Response::text("ok"))
    }

    async fn fails(req: Request, _: ()) -> Result<Response, Error> {
        let _: serde_json::Value = serde_json::from_slice(req.body())?;
        Ok(Response::text("parsed"))
    }

    async fn panics(_: Request, _: ()) -> Result<Response, Error> {
        panic!("boom")
    }

    fn dispatcher() -> Dispatcher<()> {
        let router = Router::new()
            .static_route(Method::Get, "/ok", ok)
            .static_route(Method::Post, "/parse", fails)
            .static_route(Method::Get, "/panic", panics);
        Dispatcher::new(router, ())
    }

    #[tokio::test]
    async fn handled_response_is_returned_as_is() {
        let res = dispatcher().dispatch(Request::new("GET", "/ok", "")).await;
        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(res.body(), b"ok");
    }

    #[tokio::test]
    async fn miss_is_404_with_empty_body() {
        let res = dispatcher().dispatch(Request::new("GET", "/nope", "")).await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn unknown_method_is_404() {
        let res = dispatcher().dispatch(Request::new("BREW", "/ok", "")).await;
        assert_eq!(res.status_code(), Status::NotFound);
    }

    #[tokio::test]
    async fn handler_error_is_500() {
        let d = dispatcher();
        let res = d.dispatch(Request::new("POST", "/parse", "{not json")).await;
        assert_eq!(res.status_code(), Status::InternalServerError);
        assert!(res.body().is_empty());

        let res = d.dispatch(Request::new("POST", "/parse", "{}")).await;
        assert_eq!(res.status_code(), Status::Ok);
    }

    #[tokio::test]
    async fn handler_panic_is_500() {
        let res = dispatcher().dispatch(Request::new("GET", "/panic", "")).await;
        assert_eq!(res.status_code(), Status::InternalServerError);
    }
}
