use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::ApiResult,
    db::repositories::CommentRepository,
    state::AppState,
};
use tangle_types::{Comment, CommentList, CreateCommentRequest};

/// POST /comments - Add a comment to a post
pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let comment_repo = CommentRepository::new(state.db.pool.clone());
    let comment = comment_repo.create(payload.post_id, &payload.text, payload.user_id)?;

    Ok(Json(comment))
}

/// GET /posts/:id/comments - List a post's comments with the count
pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<CommentList>> {
    let comment_repo = CommentRepository::new(state.db.pool.clone());
    let comments = comment_repo.list_by_post(post_id)?;

    Ok(Json(CommentList {
        post_id,
        comment_count: comments.len() as i64,
        comments,
    }))
}
