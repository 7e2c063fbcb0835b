use sqlx::SqlitePool;

use crate::model::{Comment, Post};

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    author: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: Some(row.id),
            title: row.title,
            content: row.content,
            author: Some(row.author),
            comments: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    author: String,
    post: i64,
}

pub struct PostMapper<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostMapper<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Every post, oldest first, without comments.
    pub async fn find_all(&self) -> Result<Vec<Post>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PostRow>(
            "SELECT id, title, content, author FROM posts ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, title, content, author FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Post::from))
    }

    /// The post with its comments in creation order.
    pub async fn find_by_id_with_comments(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        let Some(mut post) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, content, author, post FROM comments WHERE post = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        post.comments = rows.into_iter()
            .map(|row| Comment {
                id: Some(row.id),
                content: row.content,
                author: Some(row.author),
                post: Some(row.post),
            })
            .collect();
        Ok(Some(post))
    }

    /// Inserts `post` and returns its new id.
    pub async fn save(&self, post: &Post) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO posts (title, content, author) VALUES (?, ?, ?)")
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.author.as_deref())
            .execute(self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, post: &Post) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ?")
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Deletes the post; its comments go with it.
    pub async fn delete(&self, post: &Post) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post.id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Comment, Post, User};
    use crate::store::memory_db;

    #[tokio::test]
    async fn saves_and_reads_back_posts() {
        let db = memory_db().await;
        db.users().save(&User::new("alice", "secret")).await.unwrap();

        let id = db.posts().save(&Post::new("Hello", "World", "alice")).await.unwrap();
        let post = db.posts().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(post.title, "Hello");
        assert!(post.is_authored_by("alice"));

        assert_eq!(db.posts().find_all().await.unwrap().len(), 1);
        assert!(db.posts().find_by_id(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn updates_and_deletes_with_comments() {
        let db = memory_db().await;
        db.users().save(&User::new("alice", "secret")).await.unwrap();
        let id = db.posts().save(&Post::new("a", "b", "alice")).await.unwrap();

        let mut post = db.posts().find_by_id(id).await.unwrap().unwrap();
        post.title = "changed".into();
        db.posts().update(&post).await.unwrap();

        let comment = Comment {
            content: "nice".into(),
            author: Some("alice".into()),
            post: Some(id),
            ..Comment::default()
        };
        db.comments().save(&comment).await.unwrap();

        let post = db.posts().find_by_id_with_comments(id).await.unwrap().unwrap();
        assert_eq!(post.title, "changed");
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].content, "nice");

        db.posts().delete(&post).await.unwrap();
        assert!(db.posts().find_by_id_with_comments(id).await.unwrap().is_none());
    }
}
