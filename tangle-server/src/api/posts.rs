use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    api::{ApiError, ApiResult},
    db::repositories::{CommentRepository, LikeRepository, PostRepository},
    state::AppState,
};
use tangle_types::{CreatePostRequest, LikeSummary, Post, PostWithComments};

/// POST /posts - Create a new post
pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<Json<Post>> {
    if payload.content.is_empty() {
        return Err(ApiError::BadRequest(
            "Post content cannot be empty".to_string(),
        ));
    }

    let post_repo = PostRepository::new(state.db.pool.clone());
    let post = post_repo.create(
        payload.user_id,
        &payload.title,
        &payload.content,
        payload.author.as_deref(),
    )?;

    Ok(Json(post))
}

/// DELETE /posts/:id - Delete a post and everything hanging off it
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let post_repo = PostRepository::new(state.db.pool.clone());
    post_repo.delete(post_id)?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct UserPostsQuery {
    #[serde(default)]
    include_comments: bool,
}

/// GET /users/:id/posts - List a user's posts, with nested comments on request
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<UserPostsQuery>,
) -> ApiResult<Json<Vec<PostWithComments>>> {
    let post_repo = PostRepository::new(state.db.pool.clone());
    let comment_repo = CommentRepository::new(state.db.pool.clone());

    let posts = post_repo.list_by_user(user_id)?;

    let mut entries = Vec::with_capacity(posts.len());
    for post in posts {
        let comments = if query.include_comments {
            Some(comment_repo.list_by_post(post.id)?)
        } else {
            None
        };
        entries.push(PostWithComments { post, comments });
    }

    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// GET /posts/search?q= - Case-insensitive substring search over post titles
pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Post>>> {
    let post_repo = PostRepository::new(state.db.pool.clone());
    let posts = post_repo.search_titles(&query.q)?;

    Ok(Json(posts))
}

/// POST /posts/:post_id/likes/:user_id - Record a like
pub async fn like_post(
    State(state): State<AppState>,
    Path((post_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let like_repo = LikeRepository::new(state.db.pool.clone());
    like_repo.add(user_id, post_id)?;

    Ok(StatusCode::CREATED)
}

/// GET /posts/:id/likes - Like count plus the names of everyone who liked it
pub async fn get_post_likes(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<LikeSummary>> {
    let like_repo = LikeRepository::new(state.db.pool.clone());
    let summary = like_repo.summary_for_post(post_id)?;

    Ok(Json(summary))
}
