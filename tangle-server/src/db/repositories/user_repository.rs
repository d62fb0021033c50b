use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;

use tangle_types::{User, UserPostCount};

use crate::db::{DbPool, StoreError, StoreResult};

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a unique name
    pub fn create(&self, name: &str) -> StoreResult<User> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE name = ?",
            [name],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(StoreError::Conflict(format!(
                "user '{}' already exists",
                name
            )));
        }

        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO users (name, created_at) VALUES (?, ?)",
            (name, created_at.to_rfc3339()),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(User {
            id,
            name: name.to_string(),
            created_at,
        })
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at
             FROM users
             WHERE id = ?",
        )?;

        let user = stmt
            .query_row([user_id], |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get::<_, String>(2)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })
            .optional()?;

        Ok(user)
    }

    /// Get user by name
    pub fn get_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at
             FROM users
             WHERE name = ?",
        )?;

        let user = stmt
            .query_row([name], |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get::<_, String>(2)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })
            .optional()?;

        Ok(user)
    }

    /// Get all users with each user's post count
    pub fn list_with_post_counts(&self) -> StoreResult<Vec<UserPostCount>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, COUNT(p.id) AS post_count
             FROM users u
             LEFT JOIN posts p ON p.user_id = u.id
             GROUP BY u.id, u.name
             ORDER BY u.name",
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(UserPostCount {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    post_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}
