//! HTML rendering with Handlebars.
//!
//! Templates live under `templates/` and are compiled into the binary. Each
//! page module renders its main fragment; [`Page`] wraps the fragment in the
//! layout with the navigation bar, the flash message and the language
//! selector. Handlebars escapes every `{{value}}`; only the rendered body is
//! inserted raw.
//!
//! Two helpers translate inside templates: `{{t lang "Key"}}` and
//! `{{tf lang "Hello %s" name}}`.

pub mod posts;
pub mod users;

use handlebars::{Handlebars, RenderError, TemplateError, handlebars_helper};
use serde::Serialize;

use crate::i18n::Language;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../../templates/layout.hbs")),
    ("posts/index", include_str!("../../templates/posts/index.hbs")),
    ("posts/show", include_str!("../../templates/posts/show.hbs")),
    ("posts/form", include_str!("../../templates/posts/form.hbs")),
    ("users/login", include_str!("../../templates/users/login.hbs")),
    ("users/register", include_str!("../../templates/users/register.hbs")),
];

/// The compiled template registry.
pub struct Views {
    hb: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut hb = Handlebars::new();
        for (name, source) in TEMPLATES {
            hb.register_template_string(name, source)?;
        }

        handlebars_helper!(t: |lang: str, key: str| language(lang).tr(key).to_owned());
        handlebars_helper!(tf: |lang: str, key: str, arg: str| language(lang).trf(key, arg));
        hb.register_helper("t", Box::new(t));
        hb.register_helper("tf", Box::new(tf));

        Ok(Self { hb })
    }

    pub(crate) fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        self.hb.render(name, data)
    }
}

fn language(code: &str) -> Language {
    code.parse().unwrap_or_default()
}

/// Outer frame of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Navigation bar with login state.
    Default,
    /// Welcome banner, used by the login and register pages.
    Welcome,
}

/// A page ready to render.
pub struct Page<'a> {
    pub title: &'static str,
    pub layout: Layout,
    pub language: Language,
    pub current_user: Option<&'a str>,
    pub flash: Option<&'a str>,
    pub body: String,
}

#[derive(Serialize)]
struct LayoutContext<'a> {
    lang: Language,
    title: &'static str,
    welcome: bool,
    current_user: Option<&'a str>,
    flash: Option<&'a str>,
    body: &'a str,
}

impl Page<'_> {
    pub fn render(&self, views: &Views) -> Result<String, RenderError> {
        views.render("layout", &LayoutContext {
            lang: self.language,
            title: self.title,
            welcome: self.layout == Layout::Welcome,
            current_user: self.current_user,
            flash: self.flash,
            body: &self.body,
        })
    }
}
