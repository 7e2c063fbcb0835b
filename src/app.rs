//! Application state and the two route tables.

use std::sync::Arc;

use handlebars::TemplateError;

use crate::dispatch::UriDispatcher;
use crate::health;
use crate::i18n::Language;
use crate::method::Method;
use crate::pages;
use crate::rest;
use crate::router::Router;
use crate::session::SessionStore;
use crate::store::Db;
use crate::view::Views;

/// Everything a handler may touch. Shared read-only behind an `Arc`; the
/// session store is the only interior-mutable part.
pub struct AppState {
    pub db: Db,
    pub sessions: SessionStore,
    pub views: Views,
}

pub type App = Arc<AppState>;

impl AppState {
    /// Fails only when a bundled template does not compile.
    pub fn new(db: Db, default_language: Language) -> Result<App, TemplateError> {
        Ok(Arc::new(Self {
            db,
            sessions: SessionStore::new(default_language),
            views: Views::new()?,
        }))
    }
}

/// The REST route table. More specific patterns come first: the dispatcher
/// stops at the first match.
pub fn rest_routes() -> UriDispatcher<App> {
    UriDispatcher::new()
        .map(Method::Get, "/post", rest::posts::get_posts)
        .map(Method::Get, "/post/$1", rest::posts::read_post)
        .map(Method::Post, "/post", rest::posts::create_post)
        .map(Method::Post, "/post/$1/comment", rest::posts::create_comment)
        .map(Method::Put, "/post/$1", rest::posts::update_post)
        .map(Method::Delete, "/post/$1", rest::posts::delete_post)
        .map(Method::Get, "/user/$1", rest::users::login)
        .map(Method::Post, "/user", rest::users::post_user)
}

/// The HTML page routes.
pub fn page_routes() -> Router<App> {
    Router::new()
        .get("/", pages::home)
        .get("/posts", pages::posts::index)
        .get("/posts/add", pages::posts::add_form)
        .post("/posts/add", pages::posts::add)
        .get("/posts/{id}", pages::posts::show)
        .get("/posts/{id}/edit", pages::posts::edit_form)
        .post("/posts/{id}/edit", pages::posts::edit)
        .post("/posts/{id}/delete", pages::posts::delete)
        .post("/posts/{id}/comments", pages::comments::add)
        .get("/users/login", pages::users::login_form)
        .post("/users/login", pages::users::login)
        .get("/users/register", pages::users::register_form)
        .post("/users/register", pages::users::register)
        .get("/users/logout", pages::users::logout)
        .get("/language/{lang}", pages::language::change)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}
