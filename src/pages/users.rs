//! Login, registration and logout pages.

use tracing::{info, warn};

use crate::app::App;
use crate::model::{User, ValidationErrors};
use crate::request::Request;
use crate::response::Response;
use crate::view::{self, Layout};

use super::{PageContext, PageError};

fn credentials(req: &Request) -> User {
    let mut form = req.form();
    User::new(
        form.remove("username").unwrap_or_default(),
        form.remove("password").unwrap_or_default(),
    )
}

/// `GET /users/login`
pub async fn login_form(app: App, req: Request) -> Result<Response, PageError> {
    let ctx = PageContext::load(&app, &req);
    let body = view::users::login(&app.views, None, ctx.language())?;
    ctx.render("Login", Layout::Welcome, body)
}

/// `POST /users/login`
pub async fn login(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let user = credentials(&req);

    if !app.db.users().is_valid_user(&user.username, &user.password).await? {
        warn!(username = %user.username, "rejected login");
        let mut errors = ValidationErrors::new();
        errors.add("general", ctx.language().tr("Username is not valid"));
        let body = view::users::login(&app.views, Some(&errors), ctx.language())?;
        return ctx.render("Login", Layout::Welcome, body);
    }

    info!(username = %user.username, "logged in");
    ctx.session_mut().current_user = Some(user.username);
    Ok(ctx.redirect("/posts"))
}

/// `GET /users/register`
pub async fn register_form(app: App, req: Request) -> Result<Response, PageError> {
    let ctx = PageContext::load(&app, &req);
    let body = view::users::register(&app.views, "", None, ctx.language())?;
    ctx.render("Register", Layout::Welcome, body)
}

/// `POST /users/register`
pub async fn register(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let user = credentials(&req);

    let mut errors = user.check_is_valid_for_register().err();
    if errors.is_none() && !app.db.users().save(&user).await? {
        let mut taken = ValidationErrors::new();
        taken.add("username", ctx.language().tr("Username already exists"));
        errors = Some(taken);
    }
    if let Some(errors) = errors {
        let body = view::users::register(&app.views, &user.username, Some(&errors), ctx.language())?;
        return ctx.render("Register", Layout::Welcome, body);
    }

    info!(username = %user.username, "user registered");
    let message = ctx.language().trf("Username %s successfully added. Please login now", &user.username);
    ctx.set_flash(message);
    Ok(ctx.redirect("/users/login"))
}

/// `GET /users/logout`
pub async fn logout(app: App, req: Request) -> Response {
    PageContext::load(&app, &req).destroy_and_redirect("/users/login")
}
