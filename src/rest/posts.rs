//! `/post` endpoints.

use serde::Serialize;
use tracing::info;

use crate::app::App;
use crate::dispatch::Call;
use crate::model::{Comment, Post};
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

use super::{ApiError, authenticate, field, not_found, post_id};

#[derive(Serialize)]
struct PostSummary<'a> {
    id: i64,
    title: &'a str,
    content: &'a str,
    author_id: &'a str,
}

#[derive(Serialize)]
struct CommentView<'a> {
    id: i64,
    content: &'a str,
    author: &'a str,
}

#[derive(Serialize)]
struct PostDetail<'a> {
    id: i64,
    title: &'a str,
    content: &'a str,
    author_id: &'a str,
    comments: Vec<CommentView<'a>>,
}

#[derive(Serialize)]
struct Created<'a> {
    id: i64,
    title: &'a str,
    content: &'a str,
}

/// `GET /post`
pub async fn get_posts(app: App, _call: Call) -> Result<Response, ApiError> {
    let posts = app.db.posts().find_all().await?;
    let summaries: Vec<PostSummary<'_>> = posts.iter()
        .map(|p| PostSummary {
            id: p.id.unwrap_or_default(),
            title: &p.title,
            content: &p.content,
            author_id: p.author.as_deref().unwrap_or_default(),
        })
        .collect();
    Ok(Json(summaries).into_response())
}

/// `GET /post/$1`
pub async fn read_post(app: App, call: Call) -> Result<Response, ApiError> {
    let raw = &call.params()[0];
    let post = app.db.posts()
        .find_by_id_with_comments(post_id(raw)?)
        .await?
        .ok_or_else(|| not_found(raw))?;

    let detail = PostDetail {
        id: post.id.unwrap_or_default(),
        title: &post.title,
        content: &post.content,
        author_id: post.author.as_deref().unwrap_or_default(),
        comments: post.comments.iter()
            .map(|c| CommentView {
                id: c.id.unwrap_or_default(),
                content: &c.content,
                author: c.author.as_deref().unwrap_or_default(),
            })
            .collect(),
    };
    Ok(Json(detail).into_response())
}

/// `POST /post` with `{"title", "content"}`.
pub async fn create_post(app: App, call: Call) -> Result<Response, ApiError> {
    let username = authenticate(&app, call.request()).await?;
    let post = Post::new(field(call.body(), "title"), field(call.body(), "content"), &username);
    post.check_is_valid_for_create()?;

    let id = app.db.posts().save(&post).await?;
    info!(id, author = %username, "post created");

    let body = serde_json::to_vec(&Created { id, title: &post.title, content: &post.content })
        .unwrap_or_default();
    Ok(Response::builder()
        .status(Status::Created)
        .header("location", &format!("{}/{id}", call.request().uri_path()))
        .json(body))
}

/// `PUT /post/$1` with `{"title", "content"}`. Only the author may update.
pub async fn update_post(app: App, call: Call) -> Result<Response, ApiError> {
    let username = authenticate(&app, call.request()).await?;
    let raw = &call.params()[0];
    let mut post = app.db.posts()
        .find_by_id(post_id(raw)?)
        .await?
        .ok_or_else(|| not_found(raw))?;

    if !post.is_authored_by(&username) {
        return Err(ApiError::Forbidden("you are not the author of this post"));
    }

    post.title = field(call.body(), "title");
    post.content = field(call.body(), "content");
    post.check_is_valid_for_update()?;
    app.db.posts().update(&post).await?;
    info!(id = ?post.id, "post updated");
    Ok(Response::status(Status::Ok))
}

/// `DELETE /post/$1`. Only the author may delete.
pub async fn delete_post(app: App, call: Call) -> Result<Response, ApiError> {
    let username = authenticate(&app, call.request()).await?;
    let raw = &call.params()[0];
    let post = app.db.posts()
        .find_by_id(post_id(raw)?)
        .await?
        .ok_or_else(|| not_found(raw))?;

    if !post.is_authored_by(&username) {
        return Err(ApiError::Forbidden("you are not the author of this post"));
    }

    app.db.posts().delete(&post).await?;
    info!(id = ?post.id, "post deleted");
    Ok(Response::status(Status::Ok))
}

/// `POST /post/$1/comment` with `{"content"}`.
pub async fn create_comment(app: App, call: Call) -> Result<Response, ApiError> {
    let username = authenticate(&app, call.request()).await?;
    let raw = &call.params()[0];
    let post = app.db.posts()
        .find_by_id(post_id(raw)?)
        .await?
        .ok_or_else(|| not_found(raw))?;

    let comment = Comment {
        id: None,
        content: field(call.body(), "content"),
        author: Some(username),
        post: post.id,
    };
    comment.check_is_valid_for_create()?;
    let id = app.db.comments().save(&comment).await?;
    info!(id, post = ?post.id, "comment created");
    Ok(Response::status(Status::Created))
}
