use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;

use tangle_types::Post;

use crate::db::{DbPool, StoreError, StoreResult};

/// Minimum length of a post title, in characters
const MIN_TITLE_CHARS: usize = 3;

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post owned by an existing user
    pub fn create(
        &self,
        user_id: i64,
        title: &str,
        content: &str,
        author: Option<&str>,
    ) -> StoreResult<Post> {
        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(StoreError::InvalidInput(format!(
                "title must be at least {} characters",
                MIN_TITLE_CHARS
            )));
        }

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

        let duplicate: i64 = tx.query_row(
            "SELECT COUNT(*) FROM posts WHERE user_id = ? AND title = ?",
            (user_id, title),
            |row| row.get(0),
        )?;
        if duplicate > 0 {
            return Err(StoreError::Conflict(format!(
                "user already has a post titled '{}'",
                title
            )));
        }

        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO posts (user_id, title, content, author, created_at) VALUES (?, ?, ?, ?, ?)",
            (user_id, title, content, author, created_at.to_rfc3339()),
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Post {
            id,
            user_id,
            title: title.to_string(),
            content: content.to_string(),
            author: author.map(|s| s.to_string()),
            created_at,
        })
    }

    /// Get a single post by ID
    pub fn get_by_id(&self, post_id: i64) -> StoreResult<Option<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, content, author, created_at
             FROM posts
             WHERE id = ?",
        )?;

        let post = stmt
            .query_row([post_id], |row| {
                Ok(Post {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    author: row.get(4)?,
                    created_at: row.get::<_, String>(5)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })
            .optional()?;

        Ok(post)
    }

    /// Get all posts owned by a specific user
    pub fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;

        let user_exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        if user_exists == 0 {
            return Err(StoreError::NotFound("user"));
        }

        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, content, author, created_at
             FROM posts
             WHERE user_id = ?
             ORDER BY created_at DESC",
        )?;

        let posts = stmt
            .query_map([user_id], |row| {
                Ok(Post {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    author: row.get(4)?,
                    created_at: row.get::<_, String>(5)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Delete a post. Comments, likes, and tag links are removed with it by
    /// the schema's cascade rules, all within one transaction.
    pub fn delete(&self, post_id: i64) -> StoreResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let affected = tx.execute("DELETE FROM posts WHERE id = ?", [post_id])?;
        if affected == 0 {
            return Err(StoreError::NotFound("post"));
        }

        tx.commit()?;
        Ok(())
    }

    /// Case-insensitive substring search over post titles
    pub fn search_titles(&self, keyword: &str) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let pattern = format!("%{}%", keyword.to_lowercase());
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, content, author, created_at
             FROM posts
             WHERE LOWER(title) LIKE ?
             ORDER BY created_at DESC",
        )?;

        let posts = stmt
            .query_map([pattern], |row| {
                Ok(Post {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    author: row.get(4)?,
                    created_at: row.get::<_, String>(5)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CommentRepository, LikeRepository, TagRepository, UserRepository};
    use crate::db::Database;
    use proptest::prelude::*;

    fn setup_test_db() -> (Database, PostRepository, i64) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let user = UserRepository::new(db.pool.clone())
            .create("alice")
            .expect("Failed to create user");
        let repo = PostRepository::new(db.pool.clone());
        (db, repo, user.id)
    }

    #[test]
    fn test_create_post() {
        let (_db, repo, user_id) = setup_test_db();

        let post = repo
            .create(user_id, "Hello world", "first!", Some("Alice B."))
            .expect("Failed to create post");

        assert_eq!(post.user_id, user_id);
        assert_eq!(post.author.as_deref(), Some("Alice B."));

        let fetched = repo
            .get_by_id(post.id)
            .expect("Failed to get post")
            .expect("Post should exist");
        assert_eq!(fetched.title, "Hello world");
    }

    #[test]
    fn test_short_title_is_invalid() {
        let (_db, repo, user_id) = setup_test_db();

        let err = repo
            .create(user_id, "hi", "content", None)
            .expect_err("Two-character title should fail");

        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let (_db, repo, _user_id) = setup_test_db();

        let err = repo
            .create(999, "A valid title", "content", None)
            .expect_err("Unknown user should fail");

        assert!(matches!(err, StoreError::NotFound("user")));
    }

    #[test]
    fn test_duplicate_title_per_user_is_conflict() {
        let (db, repo, user_id) = setup_test_db();

        repo.create(user_id, "My day", "part one", None)
            .expect("First post should succeed");
        let err = repo
            .create(user_id, "My day", "part two", None)
            .expect_err("Same title for same user should fail");
        assert!(matches!(err, StoreError::Conflict(_)));

        // A different user may reuse the title
        let bob = UserRepository::new(db.pool.clone())
            .create("bob")
            .expect("Failed to create bob");
        repo.create(bob.id, "My day", "bob's take", None)
            .expect("Other user's post should succeed");
    }

    #[test]
    fn test_delete_cascades_to_dependents() {
        let (db, repo, user_id) = setup_test_db();
        let comment_repo = CommentRepository::new(db.pool.clone());
        let like_repo = LikeRepository::new(db.pool.clone());
        let tag_repo = TagRepository::new(db.pool.clone());

        let post = repo
            .create(user_id, "Doomed post", "content", None)
            .expect("Failed to create post");
        comment_repo
            .create(post.id, "nice", Some(user_id))
            .expect("Failed to comment");
        like_repo
            .add(user_id, post.id)
            .expect("Failed to like");
        tag_repo
            .tag_post(post.id, "news")
            .expect("Failed to tag");

        repo.delete(post.id).expect("Failed to delete post");

        assert!(repo.get_by_id(post.id).expect("Lookup failed").is_none());

        let conn = db.connection().expect("Failed to get connection");
        for table in ["comments", "likes", "post_tags"] {
            let count: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM {} WHERE post_id = ?", table),
                    [post.id],
                    |row| row.get(0),
                )
                .expect("Count query failed");
            assert_eq!(count, 0, "{} should be empty after cascade", table);
        }
    }

    #[test]
    fn test_delete_missing_post_is_not_found() {
        let (_db, repo, _user_id) = setup_test_db();

        let err = repo.delete(42).expect_err("Unknown post should fail");
        assert!(matches!(err, StoreError::NotFound("post")));
    }

    #[test]
    fn test_search_titles_is_case_insensitive() {
        let (_db, repo, user_id) = setup_test_db();

        repo.create(user_id, "Rust is great", "content", None)
            .expect("Failed to create post");
        repo.create(user_id, "Cooking notes", "content", None)
            .expect("Failed to create post");

        let hits = repo.search_titles("RUST").expect("Search failed");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust is great");

        let none = repo.search_titles("gardening").expect("Search failed");
        assert!(none.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn title_length_rule_holds(title in "[a-zA-Z0-9 ]{0,8}") {
            let (_db, repo, user_id) = setup_test_db();
            let result = repo.create(user_id, &title, "content", None);

            if title.chars().count() < MIN_TITLE_CHARS {
                prop_assert!(matches!(result, Err(StoreError::InvalidInput(_))));
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
