use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_articles))
        .route("/", post(handler::create_article))
        .route("/:slug", get(handler::get_article))
        .route("/:slug", put(handler::update_article))
        .route("/:slug", delete(handler::delete_article))
        .route("/:slug/publish", post(handler::publish_article))
        .route("/:slug/unpublish", post(handler::unpublish_article))
}
