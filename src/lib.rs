//! # mvcblog
//!
//! A small blog: server-rendered HTML pages for people and a JSON REST API
//! for programs, both backed by one SQLite database.
//!
//! Two routers share the hyper [`Server`]:
//!
//! - the page [`Router`], a radix tree with named `{id}` parameters;
//! - the REST [`UriDispatcher`](dispatch::UriDispatcher), an ordered table of
//!   `$n` patterns with first-match-wins semantics, JSON body decoding and
//!   CORS preflight answers, mounted under a prefix (default `/rest`).
//!
//! ## Dispatching REST calls
//!
//! ```rust,no_run
//! use mvcblog::dispatch::{Call, UriDispatcher};
//! use mvcblog::{Method, Request, Response};
//!
//! async fn read_post(_state: (), call: Call) -> Response {
//!     Response::text(format!("post {}", call.params()[0]))
//! }
//!
//! # async fn run() {
//! let rest = UriDispatcher::new().map(Method::Get, "/post/$1", read_post);
//! let outcome = rest.dispatch((), Request::new(Method::Get, "/post/42")).await;
//! assert!(outcome.is_dispatched());
//! # }
//! ```

pub mod app;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod i18n;
pub mod model;
pub mod pages;
pub mod rest;
pub mod session;
pub mod store;
pub mod view;

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub use error::Error;
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response};
pub use router::Router;
pub use server::{Routes, Server};
pub use status::Status;
