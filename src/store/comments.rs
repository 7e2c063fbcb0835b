use sqlx::SqlitePool;

use crate::model::Comment;

pub struct CommentMapper<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentMapper<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts `comment` and returns its new id.
    pub async fn save(&self, comment: &Comment) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO comments (content, author, post) VALUES (?, ?, ?)")
            .bind(&comment.content)
            .bind(comment.author.as_deref())
            .bind(comment.post)
            .execute(self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }
}
