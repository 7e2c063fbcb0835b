//! Incoming HTTP request type.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::method::Method;

/// An incoming HTTP request with its body already read.
///
/// `path` is the path the routers see. When the REST dispatcher is mounted
/// under a prefix, the server strips it from `path` and keeps the full path in
/// [`Request::uri_path`] for building `Location` headers.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri_path: String,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// Builds a request for `method` and a request target such as
    /// `/posts/3?lang=en`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, q),
            None => (target, ""),
        };
        Self {
            method,
            uri_path: path.to_owned(),
            path: path.to_owned(),
            query: query.to_owned(),
            headers: Vec::new(),
            body: Vec::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Re-roots the routing path, keeping the original in `uri_path`.
    pub(crate) fn with_route_path(mut self, path: &str) -> Self {
        self.path = path.to_owned();
        self
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn uri_path(&self) -> &str { &self.uri_path }
    pub fn query(&self) -> &str { &self.query }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a page route `/posts/{id}`, `req.param("id")` on `/posts/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// True when the `Content-Type` header mentions `application/json`.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.contains("application/json"))
    }

    /// Decoded query-string parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Decodes an `application/x-www-form-urlencoded` body. Later duplicates
    /// of a field overwrite earlier ones.
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body)
            .into_owned()
            .collect()
    }

    /// Value of the cookie `name` from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Credentials from an `Authorization: Basic ...` header.
    ///
    /// Returns `None` when the header is missing, uses another scheme, or does
    /// not decode to `user:password`.
    pub fn basic_auth(&self) -> Option<(String, String)> {
        let value = self.header("authorization")?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        Some((user.to_owned(), password.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_query_from_path() {
        let req = Request::new(Method::Get, "/language/change?lang=en&x=1");
        assert_eq!(req.path(), "/language/change");
        assert_eq!(req.query_param("lang").as_deref(), Some("en"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn decodes_form_bodies() {
        let req = Request::new(Method::Post, "/posts/add")
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body("title=Hello+world&content=a%26b");
        let form = req.form();
        assert_eq!(form.get("title").map(String::as_str), Some("Hello world"));
        assert_eq!(form.get("content").map(String::as_str), Some("a&b"));
    }

    #[test]
    fn reads_cookies() {
        let req = Request::new(Method::Get, "/")
            .with_header("Cookie", "a=1; MVCBLOG_SESSION=abc; b=2");
        assert_eq!(req.cookie("MVCBLOG_SESSION"), Some("abc"));
        assert_eq!(req.cookie("c"), None);
    }

    #[test]
    fn decodes_basic_credentials() {
        // "alice:secret"
        let req = Request::new(Method::Get, "/")
            .with_header("Authorization", "Basic YWxpY2U6c2VjcmV0");
        assert_eq!(
            req.basic_auth(),
            Some(("alice".to_owned(), "secret".to_owned()))
        );

        let bearer = Request::new(Method::Get, "/").with_header("Authorization", "Bearer t");
        assert_eq!(bearer.basic_auth(), None);

        let garbage = Request::new(Method::Get, "/").with_header("Authorization", "Basic !!!");
        assert_eq!(garbage.basic_auth(), None);
    }

    #[test]
    fn detects_json_content_type() {
        let req = Request::new(Method::Post, "/post")
            .with_header("Content-Type", "application/json; charset=utf-8");
        assert!(req.is_json());
        assert!(!Request::new(Method::Post, "/post").is_json());
    }
}
