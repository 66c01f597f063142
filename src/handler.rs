use std::sync::Arc;

use axum::{Json, response::IntoResponse};
use tracing::info;

use crate::config::Config;
use crate::github::GithubClient;

#[derive(Clone)]
pub struct AppState {
    pub github: Arc<GithubClient>,
    pub cfg: Arc<Config>,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(serde_json::json!({ "status": "ok" }))
}
