//! Two-level route table.
//!
//! Per HTTP method there is an exact-match map of literal paths and an
//! ordered list of compiled regex patterns. Lookup checks the literal map
//! first (O(1)); on a miss it scans the patterns in registration order and
//! takes the first full-string match.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// The application route table.
///
/// Build it once at startup and hand it to a [`Dispatcher`](crate::Dispatcher);
/// after that it is only read. `S` is the context type every handler receives.
pub struct Router<S> {
    static_routes: HashMap<Method, HashMap<String, BoxedHandler<S>>>,
    pattern_routes: HashMap<Method, Vec<(Regex, BoxedHandler<S>)>>,
}

impl<S: Send + 'static> Router<S> {
    pub fn new() -> Self {
        Self { static_routes: HashMap::new(), pattern_routes: HashMap::new() }
    }

    /// Register an exact-match route. Returns `self` for chaining.
    ///
    /// ```rust,no_run
    /// # use posta::{Error, Method, Request, Response, Router};
    /// # async fn all(_: Request, _: ()) -> Result<Response, Error> { Ok(Response::json(b"[]".to_vec())) }
    /// # async fn get(_: Request, _: ()) -> Result<Response, Error> { Ok(Response::json(b"{}".to_vec())) }
    /// Router::new()
    ///     .static_route(Method::Get, "/api/posts", all)
    ///     .pattern_route(Method::Get, r"/api/posts/\d+", get);
    /// ```
    pub fn static_route(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.add_static_path_handler(method, path, handler);
        self
    }

    /// Register a regex route. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `regex` does not compile. Routes are fixed at startup, so a
    /// bad pattern is a programming error.
    pub fn pattern_route(mut self, method: Method, regex: &str, handler: impl Handler<S>) -> Self {
        self.add_pattern_path_handler(method, regex, handler)
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// Registers an exact-match route. A second registration for the same
    /// method and path replaces the first.
    pub fn add_static_path_handler(&mut self, method: Method, path: &str, handler: impl Handler<S>) {
        self.static_routes
            .entry(method)
            .or_default()
            .insert(path.to_owned(), handler.into_boxed_handler());
    }

    /// Compiles `regex` and appends it to the method's pattern list.
    ///
    /// The pattern must match the whole path, so `\d+` never matches `12a`.
    /// Earlier registrations take precedence over later ones.
    pub fn add_pattern_path_handler(
        &mut self,
        method: Method,
        regex: &str,
        handler: impl Handler<S>,
    ) -> Result<(), Error> {
        let compiled = Regex::new(&format!("^(?:{regex})$"))
            .map_err(|source| Error::Pattern { pattern: regex.to_owned(), source })?;
        self.pattern_routes
            .entry(method)
            .or_default()
            .push((compiled, handler.into_boxed_handler()));
        Ok(())
    }

    /// Resolves `(method, path)` to a handler: literal routes first, then
    /// patterns in registration order.
    pub fn get_handler(&self, method: Method, path: &str) -> Option<BoxedHandler<S>> {
        self.static_routes
            .get(&method)
            .and_then(|paths| paths.get(path))
            .or_else(|| self.match_pattern(method, path))
            .map(Arc::clone)
    }

    fn match_pattern(&self, method: Method, path: &str) -> Option<&BoxedHandler<S>> {
        self.pattern_routes
            .get(&method)?
            .iter()
            .find(|(re, _)| re.is_match(path))
            .map(|(_, handler)| handler)
    }
}

impl<S: Send + 'static> Default for Router<S> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    type Tag = &'static str;

    async fn call(router: &Router<()>, method: Method, path: &str) -> Option<String> {
        let handler = router.get_handler(method, path)?;
        let res = handler.call(Request::new(method.as_str(), path, ""), ()).await.ok()?;
        Some(String::from_utf8(res.body().to_vec()).unwrap())
    }

    fn tagged(tag: Tag) -> impl Fn(Request, ()) -> std::future::Ready<Result<Response, Error>> + Send + Sync + 'static {
        move |_, _| std::future::ready(Ok(Response::text(tag)))
    }

    #[tokio::test]
    async fn static_route_matches_exactly() {
        let router = Router::new().static_route(Method::Get, "/api/posts", tagged("all"));

        assert_eq!(call(&router, Method::Get, "/api/posts").await.as_deref(), Some("all"));
        assert!(router.get_handler(Method::Get, "/api/posts/").is_none());
        assert!(router.get_handler(Method::Post, "/api/posts").is_none());
    }

    #[tokio::test]
    async fn static_registration_overwrites() {
        let router = Router::new()
            .static_route(Method::Get, "/x", tagged("first"))
            .static_route(Method::Get, "/x", tagged("second"));

        assert_eq!(call(&router, Method::Get, "/x").await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn static_wins_over_pattern() {
        let router = Router::new()
            .pattern_route(Method::Get, r"/api/posts/\d+", tagged("pattern"))
            .static_route(Method::Get, "/api/posts/7", tagged("static"));

        assert_eq!(call(&router, Method::Get, "/api/posts/7").await.as_deref(), Some("static"));
        assert_eq!(call(&router, Method::Get, "/api/posts/8").await.as_deref(), Some("pattern"));
    }

    #[tokio::test]
    async fn first_registered_pattern_wins() {
        let router = Router::new()
            .pattern_route(Method::Get, r"/api/posts/\d+", tagged("digits"))
            .pattern_route(Method::Get, r"/api/posts/.+", tagged("anything"));

        assert_eq!(call(&router, Method::Get, "/api/posts/5").await.as_deref(), Some("digits"));
        assert_eq!(call(&router, Method::Get, "/api/posts/x").await.as_deref(), Some("anything"));
    }

    #[test]
    fn pattern_requires_full_match() {
        let router = Router::new().pattern_route(Method::Delete, r"/api/posts/\d+", tagged("p"));

        assert!(router.get_handler(Method::Delete, "/api/posts/12").is_some());
        assert!(router.get_handler(Method::Delete, "/api/posts/12a").is_none());
        assert!(router.get_handler(Method::Delete, "/v2/api/posts/12").is_none());
        assert!(router.get_handler(Method::Get, "/api/posts/12").is_none());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let mut router = Router::<()>::new();
        let err = router
            .add_pattern_path_handler(Method::Get, "/api/(posts", tagged("p"))
            .unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    #[should_panic(expected = "invalid route pattern")]
    fn pattern_route_panics_on_bad_regex() {
        let _ = Router::<()>::new().pattern_route(Method::Get, "[", tagged("p"));
    }
}
