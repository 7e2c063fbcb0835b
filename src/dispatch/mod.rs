//! URI dispatcher for the REST API.
//!
//! Routes are registered with [`UriDispatcher::map`] against positional
//! patterns such as `/post/$1/comment` and scanned in registration order on
//! every request. The first route whose method and pattern match wins; later
//! routes that would also match are never consulted. Register the most
//! specific routes first.
//!
//! ```rust,no_run
//! use mvcblog::Method;
//! use mvcblog::dispatch::{Call, Cors, UriDispatcher};
//!
//! async fn read_post(_: (), call: Call) -> String {
//!     format!("post {}", call.params()[0])
//! }
//!
//! let dispatcher = UriDispatcher::new()
//!     .map(Method::Get, "/post/$1", read_post)
//!     .with_cors(Cors::new("*", "Authorization, Content-Type"));
//! ```
//!
//! With CORS enabled an `OPTIONS` request is treated as a preflight: it is
//! matched against every route regardless of the route's method, no handler
//! runs, and the answer lists the methods of all matching routes. A real
//! request stops at its first match instead.

mod cors;
mod pattern;

use serde_json::Value;
use tracing::{debug, warn};

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

pub use cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, Cors, allow_methods};
pub use pattern::{Pattern, Segment};

/// What a REST handler receives.
#[derive(Debug)]
pub struct Call {
    params: Vec<String>,
    body: Option<Value>,
    request: Request,
}

impl Call {
    /// Captured path parameters, `$1` first.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The decoded JSON body, present when the route parses JSON and the
    /// request declared `Content-Type: application/json`.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn request(&self) -> &Request {
        &self.request
    }
}

struct Route<S> {
    method: Method,
    pattern: Pattern,
    handler: BoxedHandler<S, Call>,
    parse_json_body: bool,
}

impl<S> Route<S> {
    /// Method and path check. With CORS enabled an `OPTIONS` request skips the
    /// method comparison so preflights can discover every method on a path.
    fn matches(&self, method: Method, path: &str, cors_enabled: bool) -> Option<Vec<String>> {
        let method_ok = self.method == method || (cors_enabled && method == Method::Options);
        if !method_ok {
            return None;
        }
        self.pattern.match_path(path)
    }
}

/// Outcome of [`UriDispatcher::dispatch`].
#[derive(Debug)]
pub enum Dispatch {
    /// A route handled the request, or a preflight was answered.
    Handled(Response),
    /// No route matched; the caller answers with its own "not found".
    Unmatched,
}

impl Dispatch {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Handled(r) => Some(r),
            Self::Unmatched => None,
        }
    }
}

/// The ordered route table plus its dispatch loop.
///
/// Build it once at startup, then share it read-only; `dispatch` takes
/// `&self` and keeps no state between calls.
pub struct UriDispatcher<S> {
    routes: Vec<Route<S>>,
    cors: Option<Cors>,
}

impl<S: Clone + Send + 'static> UriDispatcher<S> {
    pub fn new() -> Self {
        Self { routes: Vec::new(), cors: None }
    }

    /// Appends a route whose JSON request bodies are decoded and passed to the
    /// handler. Returns `self` so registrations chain.
    pub fn map(self, method: Method, pattern: &str, handler: impl Handler<S, Call>) -> Self {
        self.add(method, pattern, handler, true)
    }

    /// Like [`map`](Self::map) but leaves the body undecoded; the handler can
    /// still read the raw bytes through [`Call::request`].
    pub fn map_raw(self, method: Method, pattern: &str, handler: impl Handler<S, Call>) -> Self {
        self.add(method, pattern, handler, false)
    }

    fn add(
        mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler<S, Call>,
        parse_json_body: bool,
    ) -> Self {
        debug!(%method, pattern, parse_json_body, "route registered");
        self.routes.push(Route {
            method,
            pattern: Pattern::parse(pattern),
            handler: handler.into_boxed_handler(),
            parse_json_body,
        });
        self
    }

    /// Turns on CORS. Set before the dispatcher starts serving.
    pub fn with_cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    pub fn cors(&self) -> Option<&Cors> {
        self.cors.as_ref()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes one request.
    ///
    /// Malformed JSON on a JSON-parsing route is answered here with
    /// `400 Bad Request`; an empty body decodes to no body at all. Whatever the handler returns is passed through
    /// untouched apart from the CORS origin header.
    pub async fn dispatch(&self, state: S, request: Request) -> Dispatch {
        let cors_enabled = self.cors.is_some();
        let preflight = cors_enabled && request.method() == Method::Options;
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.matches(request.method(), request.path(), cors_enabled) else {
                continue;
            };

            if preflight && route.method != Method::Options {
                if !allowed.contains(&route.method) {
                    allowed.push(route.method);
                }
                continue;
            }

            let body = if route.parse_json_body && request.is_json() && !request.body().trim_ascii().is_empty() {
                match serde_json::from_slice::<Value>(request.body()) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(pattern = %route.pattern, "malformed JSON body: {e}");
                        let response = Response::builder()
                            .status(Status::BadRequest)
                            .text(format!("malformed JSON body: {e}"));
                        return Dispatch::Handled(self.decorate(response));
                    }
                }
            } else {
                None
            };

            debug!(
                method = %request.method(),
                path = request.path(),
                pattern = %route.pattern,
                params = ?params,
                "dispatching",
            );
            let call = Call { params, body, request };
            let response = route.handler.call(state, call).await;
            return Dispatch::Handled(self.decorate(response));
        }

        if let Some(cors) = &self.cors {
            if !allowed.is_empty() {
                debug!(path = request.path(), methods = %allow_methods(&allowed), "preflight answered");
                return Dispatch::Handled(cors.preflight(&allowed));
            }
        }

        Dispatch::Unmatched
    }

    fn decorate(&self, response: Response) -> Response {
        match &self.cors {
            Some(cors) => cors.decorate(response),
            None => response,
        }
    }
}

impl<S: Clone + Send + 'static> Default for UriDispatcher<S> {
    fn default() -> Self { Self::new() }
}
