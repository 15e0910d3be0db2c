//! Posts: entity, in-memory repository, service rules and HTTP handlers.

pub mod controller;
pub mod model;
pub mod repository;
pub mod service;

pub use model::{Post, PostDto};
pub use repository::{DeletePolicy, PostRepository};
pub use service::{PostError, PostService, Saved};
