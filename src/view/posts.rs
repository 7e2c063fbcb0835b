use handlebars::RenderError;
use serde::Serialize;

use crate::i18n::Language;
use crate::model::{Post, ValidationErrors};

use super::Views;

#[derive(Serialize)]
struct Row<'a> {
    id: i64,
    title: &'a str,
    author: &'a str,
    owned: bool,
}

#[derive(Serialize)]
struct Index<'a> {
    lang: Language,
    posts: Vec<Row<'a>>,
    logged_in: bool,
}

#[derive(Serialize)]
struct CommentRow<'a> {
    author: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Show<'a> {
    lang: Language,
    id: i64,
    title: &'a str,
    author: &'a str,
    content: &'a str,
    comments: Vec<CommentRow<'a>>,
    logged_in: bool,
    draft: &'a str,
    errors: Option<&'a ValidationErrors>,
}

#[derive(Serialize)]
struct Form<'a> {
    lang: Language,
    heading: &'static str,
    action: String,
    title: &'a str,
    content: &'a str,
    errors: Option<&'a ValidationErrors>,
}

/// Table of posts. Owners get edit and delete controls; logged-in users get
/// a link to create a post.
pub fn index(
    views: &Views,
    posts: &[Post],
    current_user: Option<&str>,
    lang: Language,
) -> Result<String, RenderError> {
    let posts = posts
        .iter()
        .map(|post| Row {
            id: post.id.unwrap_or_default(),
            title: &post.title,
            author: post.author.as_deref().unwrap_or_default(),
            owned: current_user.is_some_and(|u| post.is_authored_by(u)),
        })
        .collect();
    views.render("posts/index", &Index { lang, posts, logged_in: current_user.is_some() })
}

/// One post with its comments, plus the comment form for logged-in users.
pub fn show(
    views: &Views,
    post: &Post,
    current_user: Option<&str>,
    draft: &str,
    errors: Option<&ValidationErrors>,
    lang: Language,
) -> Result<String, RenderError> {
    let comments = post
        .comments
        .iter()
        .map(|c| CommentRow {
            author: c.author.as_deref().unwrap_or_default(),
            content: &c.content,
        })
        .collect();
    views.render("posts/show", &Show {
        lang,
        id: post.id.unwrap_or_default(),
        title: &post.title,
        author: post.author.as_deref().unwrap_or_default(),
        content: &post.content,
        comments,
        logged_in: current_user.is_some(),
        draft,
        errors,
    })
}

/// Create or edit form. A post without id renders the create form.
pub fn form(
    views: &Views,
    post: &Post,
    errors: Option<&ValidationErrors>,
    lang: Language,
) -> Result<String, RenderError> {
    let (heading, action) = match post.id {
        Some(id) => ("Modify post", format!("/posts/{id}/edit")),
        None => ("Create post", "/posts/add".to_owned()),
    };
    views.render("posts/form", &Form {
        lang,
        heading,
        action,
        title: &post.title,
        content: &post.content,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Comment;

    fn post(id: i64, author: &str) -> Post {
        Post { id: Some(id), ..Post::new("<T>", "body", author) }
    }

    #[test]
    fn index_shows_owner_controls_only_to_the_owner() {
        let views = Views::new().unwrap();
        let posts = vec![post(1, "alice"), post(2, "bob")];
        let html = index(&views, &posts, Some("alice"), Language::En).unwrap();
        assert!(html.contains("/posts/1/edit"));
        assert!(!html.contains("/posts/2/edit"));
        assert!(html.contains("confirm('are you sure?')"));
        assert!(html.contains("&lt;T&gt;"));
        assert!(html.contains("/posts/add"));

        let anonymous = index(&views, &posts, None, Language::En).unwrap();
        assert!(!anonymous.contains("/posts/add"));
        assert!(!anonymous.contains("/delete"));
    }

    #[test]
    fn show_lists_comments_and_refills_the_draft() {
        let views = Views::new().unwrap();
        let mut p = post(3, "alice");
        p.comments.push(Comment {
            id: Some(1),
            content: "first!".into(),
            author: Some("bob".into()),
            post: Some(3),
        });
        let mut errors = ValidationErrors::new();
        errors.add("content", "content is mandatory");

        let html = show(&views, &p, Some("carol"), "x", Some(&errors), Language::En).unwrap();
        assert!(html.contains("by alice"));
        assert!(html.contains("bob commented..."));
        assert!(html.contains("first!"));
        assert!(html.contains("<textarea name=\"content\">x</textarea>"));
        assert!(html.contains("content is mandatory"));
        assert!(html.contains("/posts/3/comments"));

        let spanish = show(&views, &p, None, "", None, Language::Es).unwrap();
        assert!(spanish.contains("bob ha comentado..."));
        assert!(!spanish.contains("<form"));
    }

    #[test]
    fn form_targets_add_or_edit() {
        let views = Views::new().unwrap();
        let new = form(&views, &Post::default(), None, Language::En).unwrap();
        assert!(new.contains("action=\"/posts/add\""));
        assert!(new.contains("<h1>Create post</h1>"));
        let edit = form(&views, &post(4, "alice"), None, Language::Es).unwrap();
        assert!(edit.contains("action=\"/posts/4/edit\""));
        assert!(edit.contains("Modificar artículo"));
    }
}
