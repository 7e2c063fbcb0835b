//! Post pages: listing, detail and the author-only create/edit/delete flow.

use tracing::info;

use crate::app::App;
use crate::model::Post;
use crate::request::Request;
use crate::response::Response;
use crate::view::{self, Layout};

use super::{PageContext, PageError, post_id};

/// `GET /posts`
pub async fn index(app: App, req: Request) -> Result<Response, PageError> {
    let ctx = PageContext::load(&app, &req);
    let posts = app.db.posts().find_all().await?;
    let body = view::posts::index(&app.views, &posts, ctx.current_user(), ctx.language())?;
    ctx.render("Posts", Layout::Default, body)
}

/// `GET /posts/{id}`. Shows a comment draft and its errors left behind by a
/// rejected comment submission.
pub async fn show(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let id = post_id(&req)?;
    let post = app.db.posts()
        .find_by_id_with_comments(id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("no such post with id: {id}")))?;

    let flash = ctx.session_mut().take_flash();
    if let Some(message) = flash.message {
        ctx.set_flash(message);
    }
    let body = view::posts::show(
        &app.views,
        &post,
        ctx.current_user(),
        flash.comment_draft.as_deref().unwrap_or_default(),
        flash.errors.as_ref(),
        ctx.language(),
    )?;
    ctx.render("Post", Layout::Default, body)
}

/// `GET /posts/add`
pub async fn add_form(app: App, req: Request) -> Result<Response, PageError> {
    let ctx = PageContext::load(&app, &req);
    let username = ctx.require_user("Adding posts")?;
    let body = view::posts::form(&app.views, &Post::new("", "", &username), None, ctx.language())?;
    ctx.render("Create post", Layout::Default, body)
}

/// `POST /posts/add`
pub async fn add(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let username = ctx.require_user("Adding posts")?;
    let form = req.form();
    let post = Post::new(
        form.get("title").cloned().unwrap_or_default(),
        form.get("content").cloned().unwrap_or_default(),
        &username,
    );

    if let Err(errors) = post.check_is_valid_for_create() {
        let body = view::posts::form(&app.views, &post, Some(&errors), ctx.language())?;
        return ctx.render("Create post", Layout::Default, body);
    }

    let id = app.db.posts().save(&post).await?;
    info!(id, author = %username, "post added");
    let message = ctx.language().trf("Post \"%s\" successfully added.", &post.title);
    ctx.set_flash(message);
    Ok(ctx.redirect("/posts"))
}

/// Loads the `{id}` post and checks that `username` wrote it.
async fn owned_post(app: &App, req: &Request, username: &str) -> Result<Post, PageError> {
    let id = post_id(req)?;
    let post = app.db.posts()
        .find_by_id(id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("no such post with id: {id}")))?;
    if !post.is_authored_by(username) {
        return Err(PageError::Forbidden("logged user is not the author of the post"));
    }
    Ok(post)
}

/// `GET /posts/{id}/edit`
pub async fn edit_form(app: App, req: Request) -> Result<Response, PageError> {
    let ctx = PageContext::load(&app, &req);
    let username = ctx.require_user("Editing posts")?;
    let post = owned_post(&app, &req, &username).await?;
    let body = view::posts::form(&app.views, &post, None, ctx.language())?;
    ctx.render("Modify post", Layout::Default, body)
}

/// `POST /posts/{id}/edit`
pub async fn edit(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let username = ctx.require_user("Editing posts")?;
    let mut post = owned_post(&app, &req, &username).await?;

    let form = req.form();
    post.title = form.get("title").cloned().unwrap_or_default();
    post.content = form.get("content").cloned().unwrap_or_default();

    if let Err(errors) = post.check_is_valid_for_update() {
        let body = view::posts::form(&app.views, &post, Some(&errors), ctx.language())?;
        return ctx.render("Modify post", Layout::Default, body);
    }

    app.db.posts().update(&post).await?;
    info!(id = ?post.id, "post updated");
    let message = ctx.language().trf("Post \"%s\" successfully updated.", &post.title);
    ctx.set_flash(message);
    Ok(ctx.redirect("/posts"))
}

/// `POST /posts/{id}/delete`
pub async fn delete(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let username = ctx.require_user("Deleting posts")?;
    let post = owned_post(&app, &req, &username).await?;

    app.db.posts().delete(&post).await?;
    info!(id = ?post.id, "post deleted");
    let message = ctx.language().trf("Post \"%s\" successfully deleted.", &post.title);
    ctx.set_flash(message);
    Ok(ctx.redirect("/posts"))
}
