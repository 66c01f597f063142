use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{ContentError, GithubError};

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

impl PaginationParams {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

pub fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse { data })).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse { data })).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn error(status: StatusCode, msg: &str, details: Vec<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
            details,
        }),
    )
        .into_response()
}

pub fn not_found(msg: &str) -> Response {
    error(StatusCode::NOT_FOUND, msg, vec![])
}

pub fn bad_request(msg: &str) -> Response {
    error(StatusCode::BAD_REQUEST, msg, vec![])
}

pub fn conflict(msg: &str) -> Response {
    error(StatusCode::CONFLICT, msg, vec![])
}

pub fn unprocessable(msg: &str, details: Vec<String>) -> Response {
    error(StatusCode::UNPROCESSABLE_ENTITY, msg, details)
}

pub fn internal_error(msg: &str) -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, msg, vec![])
}

pub fn bad_gateway(msg: &str) -> Response {
    error(StatusCode::BAD_GATEWAY, msg, vec![])
}

/// Maps a content-layer error onto an HTTP response. Handlers pass a short
/// operation label so logs say what was being attempted.
pub fn error_response(op: &str, err: ContentError) -> Response {
    match err {
        ContentError::NotFound(what) => not_found(&format!("{} not found", what)),
        ContentError::SlugTaken(slug) => conflict(&format!("slug '{}' already exists", slug)),
        ContentError::Validation(details) => unprocessable("validation failed", details),
        ContentError::Frontmatter(e) => {
            tracing::error!("{} failed, bad frontmatter: {}", op, e);
            internal_error("stored document has malformed frontmatter")
        }
        ContentError::Github(GithubError::ShaConflict(path)) => {
            conflict(&format!("{} changed upstream, refresh and retry", path))
        }
        ContentError::Github(GithubError::Unauthorized) => {
            tracing::error!("{} failed, github rejected the token", op);
            bad_gateway("github authentication failed")
        }
        ContentError::Github(GithubError::RateLimited) => {
            tracing::warn!("{} failed, github rate limit exhausted", op);
            bad_gateway("github rate limit exhausted")
        }
        ContentError::Github(e) => {
            tracing::error!("{} failed, github error: {}", op, crate::unpack_error(&e));
            bad_gateway("github request failed")
        }
    }
}
