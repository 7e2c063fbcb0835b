//! SQLite persistence.
//!
//! [`Db`] owns the connection pool; the mappers borrow it and translate
//! between rows and [`model`](crate::model) objects. Queries are checked at
//! runtime, so the crate builds without a database at hand.

mod comments;
mod posts;
mod users;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

pub use comments::CommentMapper;
pub use posts::PostMapper;
pub use users::UserMapper;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY NOT NULL,
        password TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        title   TEXT NOT NULL,
        content TEXT NOT NULL,
        author  TEXT NOT NULL REFERENCES users(username)
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        author  TEXT NOT NULL REFERENCES users(username),
        post    INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE
    )",
];

/// Handle to the blog database. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Opens (creating if needed) the database at `url` and ensures the
    /// schema exists.
    ///
    /// An in-memory url (`sqlite::memory:`) is pinned to a single connection
    /// that never expires, otherwise each connection would see its own empty
    /// database.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let db = Self { pool };
        db.init_schema().await?;
        info!(url, "database ready");
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Round-trips a trivial query; used by the readiness check.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }

    /// Closes the pool; later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn posts(&self) -> PostMapper<'_> {
        PostMapper::new(&self.pool)
    }

    pub fn comments(&self) -> CommentMapper<'_> {
        CommentMapper::new(&self.pool)
    }

    pub fn users(&self) -> UserMapper<'_> {
        UserMapper::new(&self.pool)
    }
}

#[cfg(test)]
pub(crate) async fn memory_db() -> Db {
    Db::connect("sqlite::memory:").await.expect("in-memory database")
}
