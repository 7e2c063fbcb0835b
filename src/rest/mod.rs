//! JSON REST endpoints, mapped onto the [`UriDispatcher`](crate::dispatch::UriDispatcher)
//! in [`app::rest_routes`](crate::app::rest_routes).
//!
//! Every endpoint returns `Result<Response, ApiError>`; the error side is
//! rendered once, here, into the status codes the API promises.

pub mod posts;
pub mod users;

use serde_json::Value;
use tracing::{error, warn};

use crate::app::App;
use crate::model::ValidationErrors;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

pub const REALM: &str = "Basic realm=\"Rest API of MVCBLOG\"";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    /// Unknown resource. The API reports these as `400 Bad Request`.
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(msg) => Response::builder()
                .status(Status::Unauthorized)
                .header("www-authenticate", REALM)
                .text(msg),
            Self::Forbidden(msg) => Response::builder().status(Status::Forbidden).text(msg),
            Self::NotFound(msg) => Response::builder().status(Status::BadRequest).text(msg),
            Self::Validation(errors) => match serde_json::to_vec(&errors) {
                Ok(body) => Response::builder().status(Status::BadRequest).json(body),
                Err(_) => Response::status(Status::BadRequest),
            },
            Self::Database(e) => {
                error!("database failure: {e}");
                Response::builder()
                    .status(Status::InternalServerError)
                    .text("internal server error")
            }
        }
    }
}

/// Checks the request's HTTP Basic credentials against the user table and
/// returns the username.
pub async fn authenticate(app: &App, request: &Request) -> Result<String, ApiError> {
    let Some((username, password)) = request.basic_auth() else {
        return Err(ApiError::Unauthorized("This operation requires authentication"));
    };
    if app.db.users().is_valid_user(&username, &password).await? {
        Ok(username)
    } else {
        warn!(%username, "rejected REST credentials");
        Err(ApiError::Unauthorized("The username/password is not valid"))
    }
}

/// String member `name` of a JSON object body; empty when absent.
pub(crate) fn field(body: Option<&Value>, name: &str) -> String {
    body.and_then(|b| b.get(name))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Parses a `$1` post id; anything unparsable is simply an unknown post.
pub(crate) fn post_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| not_found(raw))
}

pub(crate) fn not_found(raw: &str) -> ApiError {
    ApiError::NotFound(format!("Post with id {raw} not found"))
}
