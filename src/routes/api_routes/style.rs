use crate::config::DEFAULT_STYLE_PATH;
use crate::models::{AppState, StyleConfig};
use crate::utils::{self, JSON_MIME};
use crate::Result;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde_json::Value;

pub(super) async fn get_style(State(state): State<AppState>) -> impl IntoResponse {
    match state.style_storage.load().await {
        Ok(style) => (StatusCode::OK, Json(style)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(super) async fn put_style(
    State(state): State<AppState>,
    Json(document): Json<Value>,
) -> impl IntoResponse {
    match save(&state, StyleConfig::from_value(&document)).await {
        Ok(style) => (StatusCode::OK, Json(style)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(super) async fn upload_style(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let style = match super::file_field(&mut multipart, "file").await {
        Ok((_, data)) => StyleConfig::from_json_slice(&data),
        Err(e) => Err(e),
    };
    match save(&state, style).await {
        Ok(style) => (StatusCode::OK, Json(style)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(super) async fn download_style(State(state): State<AppState>) -> impl IntoResponse {
    let document = match state.style_storage.load().await {
        Ok(style) => style.to_json_pretty(),
        Err(e) => Err(e),
    };
    match document {
        Ok(document) => (utils::attachment_headers(DEFAULT_STYLE_PATH, JSON_MIME), document)
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn save(state: &AppState, style: Result<StyleConfig>) -> Result<StyleConfig> {
    let style = style?;
    state.style_storage.save(&style).await?;
    Ok(style)
}
