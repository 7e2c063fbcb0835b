//! Minimal CORS support for the REST dispatcher.

use crate::method::Method;
use crate::response::Response;
use crate::status::Status;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";

/// Cross-origin settings. A dispatcher without a `Cors` value answers no
/// preflights and adds no CORS headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cors {
    pub allowed_origin: String,
    pub allowed_request_headers: String,
}

impl Cors {
    pub fn new(allowed_origin: impl Into<String>, allowed_request_headers: impl Into<String>) -> Self {
        Self {
            allowed_origin: allowed_origin.into(),
            allowed_request_headers: allowed_request_headers.into(),
        }
    }

    /// Sets the origin header on a response produced by a handler,
    /// replacing any origin the handler set itself.
    pub(crate) fn decorate(&self, response: Response) -> Response {
        response.set_header(ALLOW_ORIGIN, &self.allowed_origin)
    }

    /// Answer to an `OPTIONS` request whose path matched routes bound to
    /// `methods`.
    pub(crate) fn preflight(&self, methods: &[Method]) -> Response {
        Response::builder()
            .status(Status::Ok)
            .header(ALLOW_ORIGIN, &self.allowed_origin)
            .header(ALLOW_HEADERS, &self.allowed_request_headers)
            .header(ALLOW_METHODS, &allow_methods(methods))
            .no_body()
    }
}

/// `GET,POST,OPTIONS`: the given methods in order, then `OPTIONS`.
pub fn allow_methods(methods: &[Method]) -> String {
    methods.iter()
        .map(|m| m.as_str())
        .chain(std::iter::once(Method::Options.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_methods_appends_options() {
        assert_eq!(allow_methods(&[Method::Get, Method::Post]), "GET,POST,OPTIONS");
        assert_eq!(allow_methods(&[]), "OPTIONS");
    }

    #[test]
    fn decorate_leaves_a_single_origin_header() {
        let cors = Cors::new("https://blog.example", "Content-Type");
        let handled = Response::text("ok").with_header("access-control-allow-origin", "*");
        let res = cors.decorate(handled);
        let origins: Vec<_> = res.headers()
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(ALLOW_ORIGIN))
            .collect();
        assert_eq!(origins.len(), 1);
        assert_eq!(res.header(ALLOW_ORIGIN), Some("https://blog.example"));
    }

    #[test]
    fn preflight_carries_all_three_headers() {
        let cors = Cors::new("*", "Authorization, Content-Type");
        let res = cors.preflight(&[Method::Delete]);
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header(ALLOW_ORIGIN), Some("*"));
        assert_eq!(res.header(ALLOW_HEADERS), Some("Authorization, Content-Type"));
        assert_eq!(res.header(ALLOW_METHODS), Some("DELETE,OPTIONS"));
    }
}
