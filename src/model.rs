//! Domain objects and their validation rules.

use std::collections::BTreeMap;

use serde::Serialize;

/// Field name to message. Rendered inline next to form fields by the pages
/// and as the JSON body of a `400` by the REST API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_owned(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn check_is_valid_for_register(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.username.chars().count() < 5 {
            errors.add("username", "Username must be at least 5 characters length");
        }
        if self.password.chars().count() < 5 {
            errors.add("password", "Password must be at least 5 characters length");
        }
        errors.into_result()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Post {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    /// Username of the author.
    pub author: Option<String>,
    /// Filled only by lookups that join comments.
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: &str) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            author: Some(author.to_owned()),
            comments: Vec::new(),
        }
    }

    pub fn is_authored_by(&self, username: &str) -> bool {
        self.author.as_deref() == Some(username)
    }

    pub fn check_is_valid_for_create(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "title is mandatory");
        }
        if self.content.trim().is_empty() {
            errors.add("content", "content is mandatory");
        }
        if self.author.is_none() {
            errors.add("author", "author is mandatory");
        }
        errors.into_result()
    }

    pub fn check_is_valid_for_update(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.id.is_none() {
            errors.add("id", "id is mandatory");
        }
        if let Err(e) = self.check_is_valid_for_create() {
            errors.merge(e);
        }
        errors.into_result()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    pub id: Option<i64>,
    pub content: String,
    /// Username of the author.
    pub author: Option<String>,
    /// Id of the commented post.
    pub post: Option<i64>,
}

impl Comment {
    pub fn check_is_valid_for_create(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.content.trim().chars().count() < 2 {
            errors.add("content", "content is mandatory");
        }
        if self.author.is_none() {
            errors.add("author", "author is mandatory");
        }
        if self.post.is_none() {
            errors.add("post", "post is mandatory");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_requires_title_content_and_author() {
        let post = Post { title: "  ".into(), ..Post::default() };
        let errors = post.check_is_valid_for_create().unwrap_err();
        assert_eq!(errors.get("title"), Some("title is mandatory"));
        assert_eq!(errors.get("content"), Some("content is mandatory"));
        assert_eq!(errors.get("author"), Some("author is mandatory"));

        assert!(Post::new("t", "c", "alice").check_is_valid_for_create().is_ok());
    }

    #[test]
    fn post_update_also_needs_an_id() {
        let post = Post::new("t", "", "alice");
        let errors = post.check_is_valid_for_update().unwrap_err();
        assert_eq!(errors.get("id"), Some("id is mandatory"));
        assert_eq!(errors.get("content"), Some("content is mandatory"));

        let post = Post { id: Some(1), ..Post::new("t", "c", "alice") };
        assert!(post.check_is_valid_for_update().is_ok());
    }

    #[test]
    fn comment_needs_two_visible_characters() {
        let mut comment = Comment {
            content: " a ".into(),
            author: Some("alice".into()),
            post: Some(1),
            ..Comment::default()
        };
        assert!(comment.check_is_valid_for_create().is_err());
        comment.content = "ok".into();
        assert!(comment.check_is_valid_for_create().is_ok());
    }

    #[test]
    fn user_names_and_passwords_have_a_minimum_length() {
        let errors = User::new("bob", "1234").check_is_valid_for_register().unwrap_err();
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_some());
        assert!(User::new("alice", "secret").check_is_valid_for_register().is_ok());
    }

    #[test]
    fn errors_serialize_as_a_flat_object() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "title is mandatory");
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"title":"title is mandatory"}"#
        );
    }
}
