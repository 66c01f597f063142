//! HTTP handlers for the media library.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
};

use super::MediaLibrary;
use crate::api::{self, PaginationParams};
use crate::handler::AppState;

fn library(state: &AppState) -> MediaLibrary<'_> {
    MediaLibrary::new(
        &state.github,
        &state.cfg.github,
        state.cfg.upload.max_size_bytes,
    )
}

pub async fn list_media(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Response {
    match library(&state).list().await {
        Ok(items) => {
            let page: Vec<_> = items
                .into_iter()
                .skip(params.offset())
                .take(params.limit())
                .collect();
            api::success(page)
        }
        Err(e) => api::error_response("list media", e),
    }
}

pub async fn upload_media(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let lib = library(&state);
    let mut uploaded = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("malformed multipart stream: {}", e);
                return api::bad_request("malformed multipart body");
            }
        };
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("failed to read multipart field '{}': {}", file_name, e);
                return api::bad_request("failed to read uploaded file");
            }
        };

        tracing::info!("processing upload '{}' ({} bytes)", file_name, data.len());
        match lib.upload(&file_name, &content_type, &data).await {
            Ok(item) => uploaded.push(item),
            Err(e) => return api::error_response("upload media", e),
        }
    }

    if uploaded.is_empty() {
        return api::bad_request("no file field in multipart body");
    }
    api::created(uploaded)
}

pub async fn delete_media(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match library(&state).delete(&name).await {
        Ok(()) => {
            tracing::info!("deleted media '{}'", name);
            api::no_content()
        }
        Err(e) => api::error_response("delete media", e),
    }
}
