use crate::models::{
    AppState, ArchiveRequest, ProcessRequest, ProcessResponse, SessionFiles, StyleConfig,
    Summary, UploadResponse,
};
use crate::order_service::{self, archive, parser};
use crate::storage::GeneratedFiles;
use crate::utils::{self, XLSX_MIME, ZIP_MIME};
use crate::{AppError, Result};
use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

pub(super) async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let result = match super::file_field(&mut multipart, "file").await {
        Ok((file_name, data)) => start_session(&state, file_name, data).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(r) => (StatusCode::CREATED, Json(r)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn start_session(state: &AppState, file_name: String, data: Bytes) -> Result<UploadResponse> {
    info!("Recebida planilha '{file_name}' ({} bytes)", data.len());
    let dataset = tokio::task::spawn_blocking(move || parser::read_first_sheet(data)).await??;
    let style = state.style_storage.load().await?;
    let columns = dataset.columns().to_vec();
    let rows = dataset.len();
    let summary = order_service::summarize_upload(&dataset);
    let suggested_removed_columns = order_service::default_removed_columns(&columns);
    let session_id = state
        .session_storage
        .create(file_name.clone(), dataset, style)
        .await;
    Ok(UploadResponse {
        session_id,
        file_name,
        rows,
        columns,
        suggested_removed_columns,
        summary: summary.into(),
    })
}

pub(super) async fn process(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProcessRequest>,
) -> impl IntoResponse {
    match run_process(&state, id, request).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e @ AppError::MissingColumn(_)) => {
            warn!("{e}");
            let body = ProcessResponse {
                files: Vec::new(),
                summary: Summary::default().into(),
                message: Some(e.to_string()),
            };
            (e.status_code(), Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// One full pass over the session's upload.
///
/// The session's file set is replaced as a whole: every generated workbook on
/// success, nothing when the pass fails, so files from an earlier pass never
/// outlive a failed one.
async fn run_process(state: &AppState, id: Uuid, request: ProcessRequest) -> Result<ProcessResponse> {
    let session = state.session_storage.get(id).await?;
    let today = utils::today();
    let outcome = tokio::task::spawn_blocking(move || {
        order_service::process(session.dataset, &request, &session.style, today)
    })
    .await?;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            state
                .session_storage
                .replace_files(id, GeneratedFiles::new())
                .await?;
            return Err(e);
        }
    };
    let files = outcome.files.keys().cloned().collect::<Vec<_>>();
    state.session_storage.replace_files(id, outcome.files).await?;
    Ok(ProcessResponse {
        message: Some(format!("{} arquivos gerados", files.len())),
        files,
        summary: outcome.summary.into(),
    })
}

pub(super) async fn files(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.session_storage.listing(id).await {
        Ok((file_name, files)) => {
            (StatusCode::OK, Json(SessionFiles { file_name, files })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub(super) async fn download(
    State(state): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> impl IntoResponse {
    match state.session_storage.file(id, &name).await {
        Ok(data) => (utils::attachment_headers(&name, XLSX_MIME), data).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(super) async fn pack_archive(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ArchiveRequest>,
) -> impl IntoResponse {
    let result = match state.session_storage.files(id).await {
        Ok(files) => tokio::task::spawn_blocking(move || archive::pack(&files, &request.files))
            .await
            .map_err(AppError::from)
            .and_then(|r| r),
        Err(e) => Err(e),
    };
    match result {
        Ok(Some(buffer)) => (
            utils::attachment_headers(archive::ARCHIVE_NAME, ZIP_MIME),
            buffer,
        )
            .into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub(super) async fn session_style(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(document): Json<Value>,
) -> impl IntoResponse {
    let result = match StyleConfig::from_value(&document) {
        Ok(style) => state
            .session_storage
            .set_style(id, style.clone())
            .await
            .map(|_| style),
        Err(e) => Err(e),
    };
    match result {
        Ok(style) => (StatusCode::OK, Json(style)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(super) async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.session_storage.remove(id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SessionStorage, StyleStorage};
    use anyhow::Result;
    use axum::body::to_bytes;
    use axum::response::Response;
    use chrono::{Days, Local};
    use rust_xlsxwriter::Workbook;
    use std::collections::HashMap;

    fn state(dir: &tempfile::TempDir) -> AppState {
        AppState::new(
            StyleStorage::new(dir.path().join("config_excel.json")),
            SessionStorage::default(),
        )
    }

    fn purchase_orders() -> Result<Bytes> {
        let today = Local::now().date_naive();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let next_week = today.checked_add_days(Days::new(7)).unwrap_or(today);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let header = [
            "Documento de compras",
            "Comprador",
            "Data de remessa",
            "Fornecedor/centro fornecedor",
            "Qtd.pendente",
        ];
        for (col, name) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *name)?;
        }
        let rows = [
            (4500000001.0, yesterday, "Acme"),
            (4500000002.0, next_week, "Globex"),
            (4500000003.0, next_week, "Acme"),
            (4500000004.0, next_week, "Globex"),
            (4500000005.0, next_week, "Acme"),
        ];
        for (i, (doc, due, supplier)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, *doc)?;
            sheet.write_string(row, 1, "Maria")?;
            sheet.write_string(row, 2, due.format("%Y-%m-%d").to_string())?;
            sheet.write_string(row, 3, *supplier)?;
            sheet.write_number(row, 4, 1000.0)?;
        }
        Ok(Bytes::from(workbook.save_to_buffer()?))
    }

    async fn json(response: Response) -> Result<Value> {
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    #[tokio::test]
    async fn upload_reports_columns_and_counts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let upload = start_session(&state, "pedidos.xlsx".to_string(), purchase_orders()?).await?;
        assert_eq!(upload.rows, 5);
        assert_eq!(upload.suggested_removed_columns, ["Comprador"]);
        assert_eq!(upload.summary.suppliers, 2);
        assert_eq!(upload.summary.orders, 5);
        assert_eq!(upload.summary.pending_display, "5.000");
        assert_eq!(state.session_storage.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn process_then_download_and_archive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let upload = start_session(&state, "pedidos.xlsx".to_string(), purchase_orders()?).await?;
        let id = upload.session_id;

        let request = ProcessRequest {
            removed_columns: upload.suggested_removed_columns,
            renames: HashMap::new(),
        };
        let response = process(State(state.clone()), Path(id), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await?;
        assert_eq!(body["files"], serde_json::json!(["Acme.xlsx", "Globex.xlsx"]));
        assert_eq!(body["summary"]["suppliers"], 2);

        let response = download(State(state.clone()), Path((id, "Acme.xlsx".to_string())))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(XLSX_MIME.as_bytes())
        );

        let request = ArchiveRequest {
            files: vec!["Globex.xlsx".to_string()],
        };
        let response = pack_archive(State(state.clone()), Path(id), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let entries = zip::ZipArchive::new(std::io::Cursor::new(body))?;
        assert_eq!(entries.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn empty_archive_selection_is_no_content() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let upload = start_session(&state, "pedidos.xlsx".to_string(), purchase_orders()?).await?;
        let response = pack_archive(
            State(state.clone()),
            Path(upload.session_id),
            Json(ArchiveRequest::default()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn missing_supplier_is_reported_with_zero_counts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let upload = start_session(&state, "pedidos.xlsx".to_string(), purchase_orders()?).await?;
        let request = ProcessRequest {
            removed_columns: vec!["Fornecedor/centro fornecedor".to_string()],
            renames: HashMap::new(),
        };
        let response = process(State(state.clone()), Path(upload.session_id), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json(response).await?;
        assert_eq!(body["files"], serde_json::json!([]));
        assert_eq!(body["summary"]["orders"], 0);
        assert!(body["message"]
            .as_str()
            .is_some_and(|m| m.contains("Fornecedor/centro fornecedor")));
        assert!(state.session_storage.files(upload.session_id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let response = files(State(state.clone()), Path(Uuid::new_v4()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = end_session(State(state), Path(Uuid::new_v4()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn session_style_accepts_loose_documents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let upload = start_session(&state, "pedidos.xlsx".to_string(), purchase_orders()?).await?;
        let document = serde_json::json!({ "cor_cabecalho": "#112233", "tamanho_fonte_tabela": "grande" });
        let response = session_style(State(state.clone()), Path(upload.session_id), Json(document))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let session = state.session_storage.get(upload.session_id).await?;
        assert_eq!(session.style.header_fill, "#112233");
        assert_eq!(session.style.body_font_size, StyleConfig::default().body_font_size);
        Ok(())
    }

    #[tokio::test]
    async fn listing_names_the_upload() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let upload = start_session(&state, "pedidos.xlsx".to_string(), purchase_orders()?).await?;
        let request = ProcessRequest::default();
        process(State(state.clone()), Path(upload.session_id), Json(request))
            .await
            .into_response();
        let response = files(State(state.clone()), Path(upload.session_id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await?;
        assert_eq!(body["file_name"], "pedidos.xlsx");
        assert_eq!(body["files"], serde_json::json!(["Acme.xlsx", "Globex.xlsx"]));
        Ok(())
    }

    #[tokio::test]
    async fn failed_pass_drops_earlier_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let state = state(&dir);
        let upload = start_session(&state, "pedidos.xlsx".to_string(), purchase_orders()?).await?;
        let id = upload.session_id;
        process(State(state.clone()), Path(id), Json(ProcessRequest::default()))
            .await
            .into_response();
        assert_eq!(state.session_storage.files(id).await?.len(), 2);

        let request = ProcessRequest {
            removed_columns: Vec::new(),
            renames: HashMap::from([("Comprador".to_string(), "Qtd.pendente".to_string())]),
        };
        let response = process(State(state.clone()), Path(id), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.session_storage.files(id).await?.is_empty());
        Ok(())
    }
}
