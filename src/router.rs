//! Radix-tree router for the HTML pages.
//!
//! One tree per HTTP method, O(path-length) lookup. Page paths use named
//! `{param}` segments (`/posts/{id}/edit`); the REST API has its own
//! positional dispatcher in [`crate::dispatch`].

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;

/// Outcome of a page lookup.
pub(crate) enum Lookup<S> {
    Found(BoxedHandler<S, Request>, HashMap<String, String>),
    /// The path exists under another method.
    MethodNotAllowed,
    NotFound,
}

/// The page router.
///
/// Build it once at startup and hand it to the server. Each registration
/// returns `self` so calls chain naturally.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S, Request>>>,
}

impl<S: 'static> Router<S> {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// # Panics
    ///
    /// Panics on a path matchit rejects (malformed or conflicting); routes
    /// are fixed at startup, so this surfaces as a boot failure.
    pub fn on(self, method: Method, path: &str, handler: impl Handler<S, Request>) -> Self {
        self.add(method, path, handler)
    }

    pub fn get(self, path: &str, handler: impl Handler<S, Request>) -> Self {
        self.add(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler<S, Request>) -> Self {
        self.add(Method::Post, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler<S, Request>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup<S> {
        let found = self.routes.get(&method).and_then(|tree| tree.at(path).ok());
        if let Some(matched) = found {
            let handler = Arc::clone(matched.value);
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(handler, params);
        }

        let elsewhere = self.routes.iter()
            .any(|(m, tree)| *m != method && tree.at(path).is_ok());
        if elsewhere { Lookup::MethodNotAllowed } else { Lookup::NotFound }
    }
}

impl<S: 'static> Default for Router<S> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    async fn show(_: (), req: Request) -> Response {
        Response::text(format!("post {}", req.param("id").unwrap_or("?")))
    }

    async fn list(_: (), _: Request) -> Response {
        Response::text("all")
    }

    fn router() -> Router<()> {
        Router::new()
            .get("/posts", list)
            .get("/posts/{id}", show)
    }

    #[tokio::test]
    async fn finds_handler_and_params() {
        let Lookup::Found(handler, params) = router().lookup(Method::Get, "/posts/7") else {
            panic!("expected a match");
        };
        assert_eq!(params.get("id").map(String::as_str), Some("7"));
        let req = Request::new(Method::Get, "/posts/7").with_params(params);
        let res = handler.call((), req).await;
        assert_eq!(res.body(), b"post 7");
    }

    #[test]
    fn distinguishes_wrong_method_from_missing_path() {
        let r = router();
        assert!(matches!(r.lookup(Method::Post, "/posts"), Lookup::MethodNotAllowed));
        assert!(matches!(r.lookup(Method::Get, "/nope"), Lookup::NotFound));
    }
}
