//! Application wiring: the shared context and the route table.

use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::method::Method;
use crate::post::controller::{self, POSTS_PATH};
use crate::post::{DeletePolicy, PostRepository, PostService};
use crate::router::Router;

/// Everything a handler may need, built once at startup and cloned into
/// each request.
#[derive(Debug, Clone)]
pub struct AppContext {
    posts: PostService,
}

impl AppContext {
    pub fn new(policy: DeletePolicy) -> Self {
        let repository = Arc::new(PostRepository::new(policy));
        Self { posts: PostService::new(repository) }
    }

    pub fn posts(&self) -> &PostService { &self.posts }
}

impl Default for AppContext {
    fn default() -> Self { Self::new(DeletePolicy::default()) }
}

/// Route table for the posts API.
///
/// | Method | Path | Handler |
/// |---|---|---|
/// | GET | `/api/posts` | list live posts |
/// | GET | `/api/posts/{id}` | fetch one |
/// | POST | `/api/posts` | create or update |
/// | DELETE | `/api/posts/{id}` | remove |
pub fn router() -> Router<AppContext> {
    let by_id = format!(r"{POSTS_PATH}/\d+");
    Router::new()
        .static_route(Method::Get, POSTS_PATH, controller::all)
        .pattern_route(Method::Get, &by_id, controller::get_by_id)
        .static_route(Method::Post, POSTS_PATH, controller::save)
        .pattern_route(Method::Delete, &by_id, controller::remove_by_id)
}

/// A dispatcher over [`router`] and the given context.
pub fn dispatcher(ctx: AppContext) -> Dispatcher<AppContext> {
    Dispatcher::new(router(), ctx)
}
