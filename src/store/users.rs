use sqlx::SqlitePool;

use crate::model::User;

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_unique_violation())
}

pub struct UserMapper<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserMapper<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts `user`. Returns `false` when the username is already taken;
    /// the primary key decides, so concurrent registrations of one name
    /// cannot both succeed.
    pub async fn save(&self, user: &User) -> Result<bool, sqlx::Error> {
        let inserted = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(&user.username)
            .bind(&user.password)
            .execute(self.pool)
            .await;
        match inserted {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn is_valid_user(&self, username: &str, password: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::User;
    use crate::store::memory_db;

    #[tokio::test]
    async fn checks_credentials() {
        let db = memory_db().await;
        let users = db.users();
        assert!(users.save(&User::new("alice", "secret")).await.unwrap());
        assert!(users.is_valid_user("alice", "secret").await.unwrap());
        assert!(!users.is_valid_user("alice", "wrong").await.unwrap());
        assert!(!users.is_valid_user("bob", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let db = memory_db().await;
        assert!(db.users().save(&User::new("alice", "secret")).await.unwrap());
        assert!(!db.users().save(&User::new("alice", "other")).await.unwrap());
        assert!(db.users().is_valid_user("alice", "secret").await.unwrap());
    }
}
