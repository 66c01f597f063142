use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_posts))
        .route("/", post(handler::create_post))
        .route("/:slug", get(handler::get_post))
        .route("/:slug", put(handler::update_post))
        .route("/:slug", delete(handler::delete_post))
}
