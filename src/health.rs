//! Liveness and readiness checks.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it reach its database? |

use tracing::warn;

use crate::app::App;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Always `200 OK` with body `"ok"`. Has no dependencies.
pub async fn liveness(_app: App, _req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` while the database answers,
/// `503 Service Unavailable` otherwise.
pub async fn readiness(app: App, _req: Request) -> Response {
    match app.db.ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!("readiness check failed: {e}");
            Response::status(Status::ServiceUnavailable)
        }
    }
}
