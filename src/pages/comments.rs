use tracing::info;

use crate::app::App;
use crate::model::Comment;
use crate::request::Request;
use crate::response::Response;

use super::{PageContext, PageError, post_id};

/// `POST /posts/{id}/comments`. A rejected comment goes back to the post
/// page with its draft and errors kept in the flash.
pub async fn add(app: App, req: Request) -> Result<Response, PageError> {
    let mut ctx = PageContext::load(&app, &req);
    let username = ctx.require_user("Adding comments")?;
    let id = post_id(&req)?;
    let post = app.db.posts()
        .find_by_id(id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("no such post with id: {id}")))?;

    let comment = Comment {
        id: None,
        content: req.form().remove("content").unwrap_or_default(),
        author: Some(username),
        post: post.id,
    };
    let location = format!("/posts/{id}");

    if let Err(errors) = comment.check_is_valid_for_create() {
        let flash = &mut ctx.session_mut().flash;
        flash.comment_draft = Some(comment.content);
        flash.errors = Some(errors);
        return Ok(ctx.redirect(&location));
    }

    let comment_id = app.db.comments().save(&comment).await?;
    info!(id = comment_id, post = id, "comment added");
    let message = ctx.language().trf("Comment on \"%s\" successfully added.", &post.title);
    ctx.set_flash(message);
    Ok(ctx.redirect(&location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::pages::posts;
    use crate::pages::testing::*;

    #[tokio::test]
    async fn rejected_comment_keeps_its_draft() {
        let app = app_with_user("alice").await;
        let id = app.db.posts().save(&Post::new("t", "c", "alice")).await.unwrap();
        let cookie = login_cookie(&app, "alice");

        let res = add(app.clone(), with_id(post_form("/", Some(&cookie), "content=x"), id))
            .await
            .unwrap();
        assert_eq!(res.header("location"), Some(format!("/posts/{id}").as_str()));

        let page = posts::show(app.clone(), with_id(get("/", Some(&cookie)), id)).await.unwrap();
        let html = body(&page);
        assert!(html.contains(">x</textarea>"));
        assert!(html.contains("content is mandatory"));
    }

    #[tokio::test]
    async fn accepted_comment_is_listed() {
        let app = app_with_user("alice").await;
        let id = app.db.posts().save(&Post::new("t", "c", "alice")).await.unwrap();
        let cookie = login_cookie(&app, "alice");

        add(app.clone(), with_id(post_form("/", Some(&cookie), "content=nice+post"), id))
            .await
            .unwrap();

        let page = posts::show(app.clone(), with_id(get("/", Some(&cookie)), id)).await.unwrap();
        let html = body(&page);
        assert!(html.contains("<p>nice post</p>"));
        assert!(html.contains("Comment on &quot;t&quot; successfully added."));
    }
}
