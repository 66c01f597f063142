//! HTTP handlers for the post API.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};

use super::{CreatePost, Posts, UpdatePost};
use crate::api::{self, PaginationParams};
use crate::handler::AppState;

fn store(state: &AppState) -> Posts<'_> {
    Posts::new(&state.github, &state.cfg.github.posts_dir)
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Response {
    match store(&state).list().await {
        Ok(summaries) => {
            let page: Vec<_> = summaries
                .into_iter()
                .skip(params.offset())
                .take(params.limit())
                .collect();
            api::success(page)
        }
        Err(e) => api::error_response("list posts", e),
    }
}

pub async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match store(&state).get(&slug).await {
        Ok(post) => api::success(post),
        Err(e) => api::error_response("get post", e),
    }
}

pub async fn create_post(State(state): State<AppState>, Json(payload): Json<CreatePost>) -> Response {
    match store(&state).create(payload).await {
        Ok(post) => {
            tracing::info!("created post '{}'", post.slug);
            api::created(post)
        }
        Err(e) => api::error_response("create post", e),
    }
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdatePost>,
) -> Response {
    match store(&state).update(&slug, payload).await {
        Ok(post) => api::success(post),
        Err(e) => api::error_response("update post", e),
    }
}

pub async fn delete_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match store(&state).delete(&slug).await {
        Ok(()) => {
            tracing::info!("deleted post '{}'", slug);
            api::no_content()
        }
        Err(e) => api::error_response("delete post", e),
    }
}
