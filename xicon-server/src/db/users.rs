//! Admin accounts

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;
use xicon_common::api::auth::{generate_salt, hash_password, verify_password};
use xicon_common::{Error, Result};

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    password_hash: String,
    password_salt: String,
}

impl User {
    pub fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_salt, &self.password_hash)
    }
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, password_hash, password_salt
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            password_salt: row.try_get("password_salt")?,
        })),
        None => Ok(None),
    }
}

/// Check credentials; `None` for unknown user or wrong password
///
/// The iterated hash runs on the blocking pool.
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
    let Some(user) = find_by_username(pool, username).await? else {
        return Ok(None);
    };
    let password = password.to_string();
    tokio::task::spawn_blocking(move || user.check_password(&password).then_some(user))
        .await
        .map_err(|e| Error::Internal(format!("Password check task failed: {}", e)))
}

/// Create the account, or reset its password if it already exists
pub async fn upsert_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<()> {
    let salt = generate_salt();
    let hash = {
        let (password, salt) = (password.to_string(), salt.clone());
        tokio::task::spawn_blocking(move || hash_password(&password, &salt))
            .await
            .map_err(|e| Error::Internal(format!("Password hash task failed: {}", e)))?
    };
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, password_salt, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(username) DO UPDATE SET
            password_hash = excluded.password_hash,
            password_salt = excluded.password_salt,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    info!("Admin account {:?} is configured", username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xicon_common::db::init_memory_database;

    #[tokio::test]
    async fn test_upsert_and_authenticate() {
        let pool = init_memory_database().await.unwrap();
        upsert_admin(&pool, "admin", "first").await.unwrap();

        assert!(authenticate(&pool, "admin", "first").await.unwrap().is_some());
        assert!(authenticate(&pool, "admin", "wrong").await.unwrap().is_none());
        assert!(authenticate(&pool, "nobody", "first").await.unwrap().is_none());

        // Re-running bootstrap with a new password replaces the old one
        upsert_admin(&pool, "admin", "second").await.unwrap();
        assert!(authenticate(&pool, "admin", "first").await.unwrap().is_none());
        assert!(authenticate(&pool, "admin", "second").await.unwrap().is_some());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_parallel_logins_all_resolve() {
        let pool = init_memory_database().await.unwrap();
        upsert_admin(&pool, "admin", "s3cret").await.unwrap();

        let checks = (0..8).map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                let password = if i % 2 == 0 { "s3cret" } else { "nope" };
                authenticate(&pool, "admin", password).await.unwrap().is_some()
            })
        });
        let mut accepted = 0;
        for check in checks.collect::<Vec<_>>() {
            if check.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 4);
    }
}
