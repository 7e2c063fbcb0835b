//! `/user` endpoints.

use tracing::info;

use crate::app::App;
use crate::dispatch::Call;
use crate::model::{User, ValidationErrors};
use crate::response::Response;
use crate::status::Status;

use super::{ApiError, authenticate, field};

/// `POST /user` with `{"username", "password"}`.
pub async fn post_user(app: App, call: Call) -> Result<Response, ApiError> {
    let user = User::new(field(call.body(), "username"), field(call.body(), "password"));
    user.check_is_valid_for_register()?;

    if !app.db.users().save(&user).await? {
        let mut errors = ValidationErrors::new();
        errors.add("username", "Username already exists");
        return Err(errors.into());
    }
    info!(username = %user.username, "user registered");
    Ok(Response::builder()
        .status(Status::Created)
        .header("location", &format!("{}/{}", call.request().uri_path(), user.username))
        .no_body())
}

/// `GET /user/$1`: succeeds only when the credentials belong to `$1`.
pub async fn login(app: App, call: Call) -> Result<Response, ApiError> {
    let username = authenticate(&app, call.request()).await?;
    if username != call.params()[0] {
        return Err(ApiError::Forbidden("You are not authorized to login as anyone but you"));
    }
    Ok(Response::text(format!("Hello {username}")))
}
