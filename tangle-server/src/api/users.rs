use axum::{extract::State, Json};

use crate::{
    api::{ApiError, ApiResult},
    db::repositories::UserRepository,
    state::AppState,
};
use tangle_types::{CreateUserRequest, User, UserPostCount};

/// POST /users - Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Json<User>> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("User name cannot be empty".to_string()));
    }

    let user_repo = UserRepository::new(state.db.pool.clone());
    let user = user_repo.create(payload.name.trim())?;

    Ok(Json(user))
}

/// GET /users - List all users with each user's post count
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserPostCount>>> {
    let user_repo = UserRepository::new(state.db.pool.clone());
    let users = user_repo.list_with_post_counts()?;

    Ok(Json(users))
}
