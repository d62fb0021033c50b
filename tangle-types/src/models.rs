use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    /// Optional display name shown instead of the owning user's name
    #[serde(default)]
    pub author: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    /// Commenter, when the comment was left by a known user
    #[serde(default)]
    pub user_id: Option<i64>,
    pub text: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A user row joined with how many posts they own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPostCount {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
}

/// A post with its comments nested, for listings that request them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentList {
    pub post_id: i64,
    pub comment_count: i64,
    pub comments: Vec<Comment>,
}

/// Like count for a post plus the names of everyone who liked it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeSummary {
    pub post_id: i64,
    pub like_count: i64,
    pub users: Vec<String>,
}

/// One entry in a user's feed: a post authored by someone they follow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub post_id: i64,
    pub author: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
