use chrono::{DateTime, Utc};

use tangle_types::Comment;

use crate::db::{DbPool, StoreError, StoreResult};

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a comment on an existing post, optionally attributed to a user
    pub fn create(&self, post_id: i64, text: &str, user_id: Option<i64>) -> StoreResult<Comment> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let post_exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM posts WHERE id = ?",
            [post_id],
            |row| row.get(0),
        )?;
        if post_exists == 0 {
            return Err(StoreError::NotFound("post"));
        }

        if let Some(uid) = user_id {
            let user_exists: i64 = tx.query_row(
                "SELECT COUNT(*) FROM users WHERE id = ?",
                [uid],
                |row| row.get(0),
            )?;
            if user_exists == 0 {
                return Err(StoreError::NotFound("user"));
            }
        }

        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO comments (post_id, user_id, text, created_at) VALUES (?, ?, ?, ?)",
            (post_id, user_id, text, created_at.to_rfc3339()),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Comment {
            id,
            post_id,
            user_id,
            text: text.to_string(),
            created_at,
        })
    }

    /// Get all comments on a post, oldest first
    pub fn list_by_post(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        let conn = self.pool.get()?;

        let post_exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE id = ?",
            [post_id],
            |row| row.get(0),
        )?;
        if post_exists == 0 {
            return Err(StoreError::NotFound("post"));
        }

        let mut stmt = conn.prepare(
            "SELECT id, post_id, user_id, text, created_at
             FROM comments
             WHERE post_id = ?
             ORDER BY created_at ASC, id ASC",
        )?;

        let comments = stmt
            .query_map([post_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    user_id: row.get(2)?,
                    text: row.get(3)?,
                    created_at: row.get::<_, String>(4)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}
