use chrono::{DateTime, Utc};

use tangle_types::{Post, Tag};

use crate::db::{DbPool, StoreError, StoreResult};

pub struct TagRepository {
    pool: DbPool,
}

impl TagRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Attach a tag to a post, creating the tag row if the name is new.
    /// The duplicate check is on the association only; tag names are reused
    /// freely across posts.
    pub fn tag_post(&self, post_id: i64, name: &str) -> StoreResult<Tag> {
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

        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?)", [name])?;

        // Get the tag ID (either just created or existing)
        let tag_id: i64 =
            tx.query_row("SELECT id FROM tags WHERE name = ?", [name], |row| {
                row.get(0)
            })?;

        let already: i64 = tx.query_row(
            "SELECT COUNT(*) FROM post_tags WHERE post_id = ? AND tag_id = ?",
            (post_id, tag_id),
            |row| row.get(0),
        )?;
        if already > 0 {
            return Err(StoreError::Conflict(format!(
                "post is already tagged '{}'",
                name
            )));
        }

        tx.execute(
            "INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)",
            (post_id, tag_id),
        )?;
        tx.commit()?;

        Ok(Tag {
            id: tag_id,
            name: name.to_string(),
        })
    }

    /// Get all posts carrying a tag
    pub fn list_posts_by_tag(&self, name: &str) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;

        let tag_exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tags WHERE name = ?",
            [name],
            |row| row.get(0),
        )?;
        if tag_exists == 0 {
            return Err(StoreError::NotFound("tag"));
        }

        let mut stmt = conn.prepare(
            "SELECT p.id, p.user_id, p.title, p.content, p.author, p.created_at
             FROM posts p
             JOIN post_tags pt ON p.id = pt.post_id
             JOIN tags t ON pt.tag_id = t.id
             WHERE t.name = ?
             ORDER BY p.created_at DESC",
        )?;

        let posts = stmt
            .query_map([name], |row| {
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

    /// Get the tag names on a post
    pub fn list_tags_for_post(&self, post_id: i64) -> StoreResult<Vec<String>> {
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
            "SELECT t.name FROM tags t
             JOIN post_tags pt ON t.id = pt.tag_id
             WHERE pt.post_id = ?
             ORDER BY t.name",
        )?;

        let tags = stmt
            .query_map([post_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }
}
