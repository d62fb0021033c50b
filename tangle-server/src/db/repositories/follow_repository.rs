use chrono::Utc;

use tangle_types::FeedEntry;

use crate::db::{DbPool, StoreError, StoreResult};

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a follow edge from one user to another. Self-loops and
    /// duplicate edges are rejected; the composite primary key backs up the
    /// duplicate guard under concurrent writers.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> StoreResult<()> {
        if follower_id == followed_id {
            return Err(StoreError::InvalidInput(
                "a user cannot follow themselves".to_string(),
            ));
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        for user_id in [follower_id, followed_id] {
            let exists: i64 = tx.query_row(
                "SELECT COUNT(*) FROM users WHERE id = ?",
                [user_id],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(StoreError::NotFound("user"));
            }
        }

        let already: i64 = tx.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND followed_id = ?",
            (follower_id, followed_id),
            |row| row.get(0),
        )?;
        if already > 0 {
            return Err(StoreError::Conflict(
                "already following this user".to_string(),
            ));
        }

        tx.execute(
            "INSERT INTO follows (follower_id, followed_id, created_at) VALUES (?, ?, ?)",
            (follower_id, followed_id, Utc::now().to_rfc3339()),
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Get the names of users following this user
    pub fn followers(&self, user_id: i64) -> StoreResult<Vec<String>> {
        let conn = self.pool.get()?;
        self.ensure_user(&conn, user_id)?;

        let mut stmt = conn.prepare(
            "SELECT u.name FROM follows f
             JOIN users u ON f.follower_id = u.id
             WHERE f.followed_id = ?
             ORDER BY f.created_at DESC",
        )?;

        let names = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(names)
    }

    /// Get the names of users this user follows
    pub fn following(&self, user_id: i64) -> StoreResult<Vec<String>> {
        let conn = self.pool.get()?;
        self.ensure_user(&conn, user_id)?;

        let mut stmt = conn.prepare(
            "SELECT u.name FROM follows f
             JOIN users u ON f.followed_id = u.id
             WHERE f.follower_id = ?
             ORDER BY f.created_at DESC",
        )?;

        let names = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(names)
    }

    /// Get the user's feed: posts authored by everyone they follow, newest
    /// first, each entry carrying the author's name and the post title
    pub fn feed(&self, user_id: i64) -> StoreResult<Vec<FeedEntry>> {
        let conn = self.pool.get()?;
        self.ensure_user(&conn, user_id)?;

        let mut stmt = conn.prepare(
            "SELECT p.id, u.name, p.title
             FROM follows f
             JOIN posts p ON p.user_id = f.followed_id
             JOIN users u ON u.id = p.user_id
             WHERE f.follower_id = ?
             ORDER BY p.created_at DESC",
        )?;

        let entries = stmt
            .query_map([user_id], |row| {
                Ok(FeedEntry {
                    post_id: row.get(0)?,
                    author: row.get(1)?,
                    title: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn ensure_user(&self, conn: &rusqlite::Connection, user_id: i64) -> StoreResult<()> {
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, UserRepository};
    use crate::db::Database;

    fn setup_test_db() -> (Database, FollowRepository, i64, i64) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let users = UserRepository::new(db.pool.clone());
        let alice = users.create("alice").expect("Failed to create alice");
        let bob = users.create("bob").expect("Failed to create bob");
        let repo = FollowRepository::new(db.pool.clone());
        (db, repo, alice.id, bob.id)
    }

    #[test]
    fn test_follow_and_list() {
        let (_db, repo, alice, bob) = setup_test_db();

        repo.follow(alice, bob).expect("Failed to follow");

        assert_eq!(repo.following(alice).unwrap(), vec!["bob".to_string()]);
        assert_eq!(repo.followers(bob).unwrap(), vec!["alice".to_string()]);
        assert!(repo.followers(alice).unwrap().is_empty());
    }

    #[test]
    fn test_self_follow_is_invalid() {
        let (_db, repo, alice, _bob) = setup_test_db();

        let err = repo
            .follow(alice, alice)
            .expect_err("Self-follow should fail");
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_follow_is_conflict() {
        let (_db, repo, alice, bob) = setup_test_db();

        repo.follow(alice, bob).expect("First follow should succeed");
        let err = repo
            .follow(alice, bob)
            .expect_err("Second follow should fail");
        assert!(matches!(err, StoreError::Conflict(_)));

        // The edge exists exactly once
        assert_eq!(repo.following(alice).unwrap(), vec!["bob".to_string()]);
    }

    #[test]
    fn test_follow_unknown_user_is_not_found() {
        let (_db, repo, alice, _bob) = setup_test_db();

        let err = repo.follow(alice, 999).expect_err("Unknown target should fail");
        assert!(matches!(err, StoreError::NotFound("user")));

        let err = repo.follow(999, alice).expect_err("Unknown follower should fail");
        assert!(matches!(err, StoreError::NotFound("user")));
    }

    #[test]
    fn test_feed_contains_exactly_followed_authors_posts() {
        let (db, repo, alice, bob) = setup_test_db();
        let users = UserRepository::new(db.pool.clone());
        let posts = PostRepository::new(db.pool.clone());

        let carol = users.create("carol").expect("Failed to create carol");
        let dave = users.create("dave").expect("Failed to create dave");

        let p1 = posts
            .create(bob, "Bob's post", "content", None)
            .expect("Failed to create post");
        let p2 = posts
            .create(carol.id, "Carol's post", "content", None)
            .expect("Failed to create post");
        posts
            .create(dave.id, "Dave's post", "content", None)
            .expect("Failed to create post");

        repo.follow(alice, bob).expect("Failed to follow");
        repo.follow(alice, carol.id).expect("Failed to follow");

        let feed = repo.feed(alice).expect("Failed to get feed");
        let mut ids: Vec<i64> = feed.iter().map(|e| e.post_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![p1.id, p2.id]);

        let authors: Vec<&str> = feed.iter().map(|e| e.author.as_str()).collect();
        assert!(authors.contains(&"bob"));
        assert!(authors.contains(&"carol"));
        assert!(!authors.contains(&"dave"));
    }

    #[test]
    fn test_feed_for_unknown_user_is_not_found() {
        let (_db, repo, _alice, _bob) = setup_test_db();

        let err = repo.feed(999).expect_err("Unknown user should fail");
        assert!(matches!(err, StoreError::NotFound("user")));
    }
}
