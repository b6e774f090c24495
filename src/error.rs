use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize, thiserror::Error)]
pub enum AppError {
    #[error("A coluna '{0}' não foi encontrada na planilha!")]
    MissingColumn(String),
    #[error("Mais de uma coluna ficaria com o nome '{0}'")]
    RenameCollision(String),
    #[error("Configuração de estilo inválida: {0}")]
    ConfigLoad(String),
    #[error("Erro ao ler a planilha: {0}")]
    Spreadsheet(String),
    #[error("Erro ao gerar a planilha: {0}")]
    Xlsx(String),
    #[error("Erro ao gerar o arquivo zip: {0}")]
    Archive(String),
    #[error("Erro de entrada/saída: {0}")]
    Io(String),
    #[error("Sessão {0} não encontrada")]
    SessionNotFound(uuid::Uuid),
    #[error("Arquivo '{0}' não encontrado")]
    FileNotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = core::result::Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingColumn(_) | Self::RenameCollision(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ConfigLoad(_) | Self::Spreadsheet(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::SessionNotFound(_) | Self::FileNotFound(_) => StatusCode::NOT_FOUND,
            Self::Xlsx(_) | Self::Archive(_) | Self::Io(_) | Self::Custom(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{self:?}");
        }
        (status, Json(self.to_string())).into_response()
    }
}

impl From<calamine::Error> for AppError {
    fn from(value: calamine::Error) -> Self {
        Self::Spreadsheet(value.to_string())
    }
}
impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Xlsx(value.to_string())
    }
}
impl From<zip::result::ZipError> for AppError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Archive(value.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfigLoad(value.to_string())
    }
}
impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}
impl From<MultipartError> for AppError {
    fn from(value: MultipartError) -> Self {
        Self::BadRequest(value.body_text())
    }
}
impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Custom(format!("Tarefa interrompida: {value}"))
    }
}
