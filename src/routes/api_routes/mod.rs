use crate::models::AppState;
use crate::{AppError, Result};
use axum::extract::Multipart;
use axum::routing::{get, post, put};
use axum::Router;
use bytes::Bytes;

mod orders;
mod style;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route("/uploads", post(orders::upload))
        .route("/sessions/{id}", axum::routing::delete(orders::end_session))
        .route("/sessions/{id}/process", post(orders::process))
        .route("/sessions/{id}/files", get(orders::files))
        .route("/sessions/{id}/files/{name}", get(orders::download))
        .route("/sessions/{id}/archive", post(orders::pack_archive))
        .route("/sessions/{id}/style", put(orders::session_style))
        .route("/style", get(style::get_style).put(style::put_style))
        .route("/style/upload", post(style::upload_style))
        .route("/style/download", get(style::download_style))
        .with_state(state)
}

/// Name and content of the first form field called `name`.
async fn file_field(multipart: &mut Multipart, name: &str) -> Result<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok((file_name, data));
    }
    Err(AppError::BadRequest(format!("Campo '{name}' ausente no formulário")))
}
