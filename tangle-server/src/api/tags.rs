use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::ApiResult,
    db::repositories::TagRepository,
    state::AppState,
};
use tangle_types::{Post, Tag, TagPostRequest};

/// POST /tags - Attach a tag to a post, creating the tag if needed
pub async fn tag_post(
    State(state): State<AppState>,
    Json(payload): Json<TagPostRequest>,
) -> ApiResult<Json<Tag>> {
    let tag_repo = TagRepository::new(state.db.pool.clone());
    let tag = tag_repo.tag_post(payload.post_id, &payload.name)?;

    Ok(Json(tag))
}

/// GET /tags/:name/posts - List the posts carrying a tag
pub async fn get_posts_by_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    let tag_repo = TagRepository::new(state.db.pool.clone());
    let posts = tag_repo.list_posts_by_tag(&name)?;

    Ok(Json(posts))
}
