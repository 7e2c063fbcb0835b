//! Server-rendered page controllers.
//!
//! Each controller loads a [`PageContext`] (session, logged-in user,
//! language), does its work and finishes through the context so the session
//! is written back and a fresh session gets its cookie. Failures are
//! [`PageError`]s, rendered as a short plain-text page.

pub mod comments;
pub mod language;
pub mod posts;
pub mod users;

use tracing::error;
use uuid::Uuid;

use crate::app::App;
use crate::i18n::Language;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::session::{self, COOKIE_NAME, Session};
use crate::status::Status;
use crate::view::{Layout, Page};

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Not in session. {0} requires login")]
    LoginRequired(&'static str),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("template: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::LoginRequired(_) => Status::Unauthorized,
            Self::NotFound(_) => Status::NotFound,
            Self::Forbidden(_) => Status::Forbidden,
            Self::BadRequest(_) => Status::BadRequest,
            Self::Database(e) => {
                error!("database failure: {e}");
                Status::InternalServerError
            }
            Self::Render(e) => {
                error!("template failure: {e}");
                Status::InternalServerError
            }
        };
        Response::builder()
            .status(status)
            .text(format!("An error occurred: {self}"))
    }
}

/// Per-request view of the session.
pub struct PageContext {
    app: App,
    session_id: Uuid,
    session: Session,
    fresh: bool,
}

impl PageContext {
    pub fn load(app: &App, req: &Request) -> Self {
        let (session_id, session, fresh) = app.sessions.load(req.cookie(COOKIE_NAME));
        Self { app: app.clone(), session_id, session, fresh }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn language(&self) -> Language {
        self.session.language
    }

    pub fn current_user(&self) -> Option<&str> {
        self.session.current_user.as_deref()
    }

    /// The logged-in username, or `LoginRequired` naming `action`.
    pub fn require_user(&self, action: &'static str) -> Result<String, PageError> {
        self.session.current_user.clone().ok_or(PageError::LoginRequired(action))
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Stores `message` to be shown by the next rendered page.
    pub fn set_flash(&mut self, message: String) {
        self.session.flash.message = Some(message);
    }

    /// Renders `body` inside `layout`, consuming the flash message.
    pub fn render(mut self, title: &'static str, layout: Layout, body: String) -> Result<Response, PageError> {
        let flash = self.session.flash.message.take();
        let html = Page {
            title,
            layout,
            language: self.session.language,
            current_user: self.session.current_user.as_deref(),
            flash: flash.as_deref(),
            body,
        }
        .render(&self.app.views)?;
        Ok(self.finish(Response::html(html)))
    }

    /// `303 See Other` to `location`, keeping flash values for the next page.
    pub fn redirect(self, location: &str) -> Response {
        self.finish(Response::redirect(location))
    }

    /// Ends the session and redirects.
    pub fn destroy_and_redirect(self, location: &str) -> Response {
        self.app.sessions.destroy(self.session_id);
        Response::redirect(location)
    }

    fn finish(self, response: Response) -> Response {
        self.app.sessions.save(self.session_id, self.session);
        if self.fresh {
            response.with_header("set-cookie", &session::cookie_header(self.session_id))
        } else {
            response
        }
    }
}

/// `GET /`
pub async fn home(_app: App, _req: Request) -> Response {
    Response::redirect("/posts")
}

/// Parses the `{id}` path parameter of post pages.
pub(crate) fn post_id(req: &Request) -> Result<i64, PageError> {
    let raw = req.param("id").unwrap_or_default();
    raw.parse()
        .map_err(|_| PageError::NotFound(format!("no such post with id: {raw}")))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::method::Method;
    use crate::model::User;
    use crate::store::memory_db;

    pub async fn app_with_user(username: &str) -> App {
        let db = memory_db().await;
        db.users().save(&User::new(username, "secret")).await.unwrap();
        crate::app::AppState::new(db, Language::En).unwrap()
    }

    /// A session cookie for a session logged in as `username`.
    pub fn login_cookie(app: &App, username: &str) -> String {
        let (id, mut session, _) = app.sessions.load(None);
        session.current_user = Some(username.to_owned());
        app.sessions.save(id, session);
        format!("{COOKIE_NAME}={id}")
    }

    pub fn get(path: &str, cookie: Option<&str>) -> Request {
        let req = Request::new(Method::Get, path);
        match cookie {
            Some(c) => req.with_header("cookie", c),
            None => req,
        }
    }

    pub fn post_form(path: &str, cookie: Option<&str>, form: &str) -> Request {
        let req = Request::new(Method::Post, path)
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body(form);
        match cookie {
            Some(c) => req.with_header("cookie", c),
            None => req,
        }
    }

    pub fn with_id(req: Request, id: i64) -> Request {
        let mut params = std::collections::HashMap::new();
        params.insert("id".to_owned(), id.to_string());
        req.with_params(params)
    }

    pub fn body(res: &Response) -> String {
        String::from_utf8_lossy(res.body()).into_owned()
    }
}
