use crate::app::App;
use crate::i18n::Language;
use crate::request::Request;
use crate::response::Response;

use super::{PageContext, PageError};

/// `GET /language/{lang}`: switches the session language and returns to the
/// referring page.
pub async fn change(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let language: Language = req.param("lang")
        .unwrap_or_default()
        .parse()
        .map_err(|e: crate::i18n::UnsupportedLanguage| PageError::BadRequest(e.to_string()))?;
    ctx.session_mut().language = language;

    let back = req.header("referer").unwrap_or("/posts").to_owned();
    Ok(ctx.redirect(&back))
}
