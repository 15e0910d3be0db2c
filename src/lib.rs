//! # posta
//!
//! A small posts API: create, list, fetch, update and delete `Post` records
//! held in memory. No database, no auth, no pagination.
//!
//! ## The pieces
//!
//! - [`Router`]: a two-level route table. Literal paths are an O(1) map
//!   lookup; regex paths are scanned in registration order. Literal wins.
//! - [`Dispatcher`]: resolves each request against the table, runs the
//!   handler, answers `404` on a miss and `500` when a handler fails.
//! - [`post`]: the entity, a `DashMap`-backed repository with an atomic id
//!   counter, the service rules and the HTTP handlers.
//! - [`Server`]: hyper on tokio, HTTP/1.1 and HTTP/2, graceful shutdown on
//!   SIGTERM / Ctrl-C.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use posta::{AppContext, Server, app};
//! use posta::post::DeletePolicy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), posta::Error> {
//!     let dispatcher = app::dispatcher(AppContext::new(DeletePolicy::Soft));
//!     Server::bind("0.0.0.0:8080")?.serve(dispatcher).await
//! }
//! ```
//!
//! Handlers are plain async functions taking the request and the context:
//!
//! ```rust
//! use posta::{Error, Method, Request, Response, Router, Status};
//!
//! async fn hello(req: Request, greeting: &'static str) -> Result<Response, Error> {
//!     match req.id_param() {
//!         Some(id) => Ok(Response::text(format!("{greeting} #{id}"))),
//!         None => Ok(Response::status(Status::NotFound)),
//!     }
//! }
//!
//! let router = Router::new().pattern_route(Method::Get, r"/hello/\d+", hello);
//! ```

mod dispatcher;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod app;
pub mod config;
pub mod post;

pub use app::AppContext;
pub use dispatcher::Dispatcher;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
