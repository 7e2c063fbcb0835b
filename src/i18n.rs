//! Translated user-facing strings.
//!
//! Templates are written in English; a message key is its English text.
//! Lookups for a missing key fall back to the key itself, so English needs no
//! table at all.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Translates `key`, returning the key when no translation exists.
    pub fn tr(self, key: &str) -> &str {
        let table: &'static [(&'static str, &'static str)] = match self {
            Self::Es => SPANISH,
            Self::En => &[],
        };
        table.iter()
            .find(|(k, _)| *k == key)
            .map_or(key, |&(_, v)| v)
    }

    /// Translates `key` and substitutes its single `%s` with `arg`.
    pub fn trf(self, key: &str, arg: &str) -> String {
        self.tr(key).replacen("%s", arg, 1)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language `{0}`")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(UnsupportedLanguage(other.to_owned())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

const SPANISH: &[(&str, &str)] = &[
    ("Post", "Artículo"),
    ("by %s", "por %s"),
    ("Posts", "Artículos"),
    ("Title", "Título"),
    ("Contents", "Contenido"),
    ("Author", "Autor"),
    ("Actions", "Acciones"),
    ("Create post", "Crear artículo"),
    ("Hello %s", "Hola %s"),
    ("Modify post", "Modificar artículo"),
    ("Post \"%s\" successfully added.", "Artículo \"%s\" añadido."),
    ("Post \"%s\" successfully updated.", "Artículo \"%s\" modificado."),
    ("Post \"%s\" successfully deleted.", "Artículo \"%s\" eliminado."),
    ("Comment on \"%s\" successfully added.", "Comentario en \"%s\" añadido."),
    ("Username %s successfully added. Please login now", "Usuario %s añadido. Ya puedes entrar"),
    ("Login", "Entrar"),
    ("Logout", "Salir"),
    ("Username", "Nombre de usuario"),
    ("Password", "Contraseña"),
    ("Not user?", "Nuevo aquí?"),
    ("Register here!", "¡Regístrate aquí!"),
    ("Register", "Registro"),
    ("Edit", "Editar"),
    ("Delete", "Eliminar"),
    ("Comments", "Comentarios"),
    ("Write a comment", "Escribe un comentario"),
    ("%s commented...", "%s ha comentado..."),
    ("Comment", "Comentario"),
    ("do comment", "comentar"),
    ("Spanish", "Español"),
    ("English", "Inglés"),
    ("Welcome to the Blog App!", "¡Bienvenido a la App Blog!"),
    ("are you sure?", "¿Estás seguro?"),
    ("Username is not valid", "El usuario no es válido"),
    ("Username already exists", "El usuario ya existe"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_translates_known_keys() {
        assert_eq!(Language::Es.tr("Posts"), "Artículos");
        assert_eq!(Language::Es.trf("Hello %s", "alice"), "Hola alice");
    }

    #[test]
    fn missing_keys_fall_back_to_the_key() {
        assert_eq!(Language::Es.tr("Nothing like this"), "Nothing like this");
        assert_eq!(Language::En.tr("Posts"), "Posts");
        assert_eq!(Language::En.trf("by %s", "bob"), "by bob");
    }

    #[test]
    fn parses_language_codes() {
        assert_eq!("en".parse::<Language>(), Ok(Language::En));
        assert!("fr".parse::<Language>().is_err());
    }
}
