//! HTTP handlers for the article API.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};

use super::{ArticleStatus, Articles, CreateArticle, UpdateArticle};
use crate::api::{self, PaginationParams};
use crate::handler::AppState;

fn store(state: &AppState) -> Articles<'_> {
    Articles::new(&state.github, &state.cfg.github.articles_dir)
}

pub async fn list_articles(
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
        Err(e) => api::error_response("list articles", e),
    }
}

pub async fn get_article(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match store(&state).get(&slug).await {
        Ok(article) => api::success(article),
        Err(e) => api::error_response("get article", e),
    }
}

pub async fn create_article(
    State(state): State<AppState>,
    Json(payload): Json<CreateArticle>,
) -> Response {
    match store(&state).create(payload).await {
        Ok(article) => {
            tracing::info!("created article '{}'", article.slug);
            api::created(article)
        }
        Err(e) => api::error_response("create article", e),
    }
}

pub async fn update_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateArticle>,
) -> Response {
    match store(&state).update(&slug, payload).await {
        Ok(article) => api::success(article),
        Err(e) => api::error_response("update article", e),
    }
}

pub async fn delete_article(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match store(&state).delete(&slug).await {
        Ok(()) => {
            tracing::info!("deleted article '{}'", slug);
            api::no_content()
        }
        Err(e) => api::error_response("delete article", e),
    }
}

pub async fn publish_article(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match store(&state).set_status(&slug, ArticleStatus::Published).await {
        Ok(article) => {
            tracing::info!("published article '{}'", slug);
            api::success(article)
        }
        Err(e) => api::error_response("publish article", e),
    }
}

pub async fn unpublish_article(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match store(&state).set_status(&slug, ArticleStatus::Draft).await {
        Ok(article) => {
            tracing::info!("unpublished article '{}'", slug);
            api::success(article)
        }
        Err(e) => api::error_response("unpublish article", e),
    }
}
