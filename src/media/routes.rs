use axum::{
    Router,
    routing::{delete, get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_media))
        .route("/", post(handler::upload_media))
        .route("/:name", delete(handler::delete_media))
}
