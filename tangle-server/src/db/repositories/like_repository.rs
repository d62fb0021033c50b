use chrono::Utc;

use tangle_types::LikeSummary;

use crate::db::{DbPool, StoreError, StoreResult};

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record that a user liked a post. A user may like a given post at most
    /// once; the composite primary key backs up the duplicate guard under
    /// concurrent writers.
    pub fn add(&self, user_id: i64, post_id: i64) -> StoreResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let user_exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        if user_exists == 0 {
            return Err(StoreError::NotFound("user"));
        }

        let post_exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM posts WHERE id = ?",
            [post_id],
            |row| row.get(0),
        )?;
        if post_exists == 0 {
            return Err(StoreError::NotFound("post"));
        }

        let already: i64 = tx.query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ? AND post_id = ?",
            (user_id, post_id),
            |row| row.get(0),
        )?;
        if already > 0 {
            return Err(StoreError::Conflict(
                "user has already liked this post".to_string(),
            ));
        }

        tx.execute(
            "INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
            (user_id, post_id, Utc::now().to_rfc3339()),
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Get the like count for a post plus the names of everyone who liked it
    pub fn summary_for_post(&self, post_id: i64) -> StoreResult<LikeSummary> {
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
            "SELECT u.name FROM likes l
             JOIN users u ON l.user_id = u.id
             WHERE l.post_id = ?
             ORDER BY l.created_at ASC",
        )?;

        let users: Vec<String> = stmt
            .query_map([post_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LikeSummary {
            post_id,
            like_count: users.len() as i64,
            users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, UserRepository};
    use crate::db::Database;

    fn setup_test_db() -> (Database, LikeRepository, i64, i64) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let user = UserRepository::new(db.pool.clone())
            .create("alice")
            .expect("Failed to create user");
        let post = PostRepository::new(db.pool.clone())
            .create(user.id, "A post", "content", None)
            .expect("Failed to create post");
        let repo = LikeRepository::new(db.pool.clone());
        (db, repo, user.id, post.id)
    }

    #[test]
    fn test_like_and_summary() {
        let (db, repo, user_id, post_id) = setup_test_db();

        let bob = UserRepository::new(db.pool.clone())
            .create("bob")
            .expect("Failed to create bob");

        repo.add(user_id, post_id).expect("Failed to like");
        repo.add(bob.id, post_id).expect("Failed to like");

        let summary = repo
            .summary_for_post(post_id)
            .expect("Failed to get summary");
        assert_eq!(summary.like_count, 2);
        let mut users = summary.users;
        users.sort();
        assert_eq!(users, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_double_like_is_conflict() {
        let (_db, repo, user_id, post_id) = setup_test_db();

        repo.add(user_id, post_id).expect("First like should succeed");
        let err = repo
            .add(user_id, post_id)
            .expect_err("Second like should fail");
        assert!(matches!(err, StoreError::Conflict(_)));

        let summary = repo
            .summary_for_post(post_id)
            .expect("Failed to get summary");
        assert_eq!(summary.like_count, 1);
    }

    #[test]
    fn test_missing_references_are_not_found() {
        let (_db, repo, user_id, post_id) = setup_test_db();

        let err = repo.add(999, post_id).expect_err("Unknown user should fail");
        assert!(matches!(err, StoreError::NotFound("user")));

        let err = repo.add(user_id, 999).expect_err("Unknown post should fail");
        assert!(matches!(err, StoreError::NotFound("post")));

        let err = repo
            .summary_for_post(999)
            .expect_err("Unknown post should fail");
        assert!(matches!(err, StoreError::NotFound("post")));
    }
}
