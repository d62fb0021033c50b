use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::ApiResult,
    db::repositories::FollowRepository,
    state::AppState,
};
use tangle_types::FeedEntry;

/// POST /users/:user_id/follow/:target_id - Follow a user
pub async fn follow_user(
    State(state): State<AppState>,
    Path((user_id, target_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let follow_repo = FollowRepository::new(state.db.pool.clone());
    follow_repo.follow(user_id, target_id)?;

    Ok(StatusCode::CREATED)
}

/// GET /users/:id/followers - Names of users following this user
pub async fn get_followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<String>>> {
    let follow_repo = FollowRepository::new(state.db.pool.clone());
    let names = follow_repo.followers(user_id)?;

    Ok(Json(names))
}

/// GET /users/:id/following - Names of users this user follows
pub async fn get_following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<String>>> {
    let follow_repo = FollowRepository::new(state.db.pool.clone());
    let names = follow_repo.following(user_id)?;

    Ok(Json(names))
}

/// GET /users/:id/feed - Posts authored by everyone this user follows
pub async fn get_feed(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<FeedEntry>>> {
    let follow_repo = FollowRepository::new(state.db.pool.clone());
    let feed = follow_repo.feed(user_id)?;

    Ok(Json(feed))
}
