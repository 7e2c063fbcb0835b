use handlebars::RenderError;
use serde::Serialize;

use crate::i18n::Language;
use crate::model::ValidationErrors;

use super::Views;

#[derive(Serialize)]
struct Form<'a> {
    lang: Language,
    username: &'a str,
    errors: Option<&'a ValidationErrors>,
}

pub fn login(views: &Views, errors: Option<&ValidationErrors>, lang: Language) -> Result<String, RenderError> {
    views.render("users/login", &Form { lang, username: "", errors })
}

pub fn register(
    views: &Views,
    username: &str,
    errors: Option<&ValidationErrors>,
    lang: Language,
) -> Result<String, RenderError> {
    views.render("users/register", &Form { lang, username, errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_keeps_the_username_and_shows_errors() {
        let views = Views::new().unwrap();
        let mut errors = ValidationErrors::new();
        errors.add("password", "Password must be at least 5 characters length");
        let html = register(&views, "al\"ice", Some(&errors), Language::En).unwrap();
        assert!(html.contains("value=\"al&quot;ice\""));
        assert!(html.contains("Password must be at least 5 characters length"));
        assert!(!html.contains("class=\"error\"></span>"));
    }

    #[test]
    fn login_is_translated() {
        let views = Views::new().unwrap();
        let html = login(&views, None, Language::Es).unwrap();
        assert!(html.contains("Nombre de usuario"));
        assert!(html.contains("¡Regístrate aquí!"));
    }
}
