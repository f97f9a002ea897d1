//! error

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::DbErr;

use crate::adapter::cmd::node::NodeValidationError;
use crate::adapter::Response as Envelope;
use crate::service::task::TaskError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),
    #[error(transparent)]
    NodeField(#[from] NodeValidationError),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Db(DbErr),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    MsgError(String),
}

impl From<DbErr> for AppError {
    fn from(value: DbErr) -> Self {
        match value {
            DbErr::RecordNotFound(what) => AppError::NotFound(what),
            e => AppError::Db(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonRejection(rejection) => rejection.status(),
            AppError::NodeField(_) | AppError::MsgError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Task(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Db(_) | AppError::Config(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match &self {
            AppError::JsonRejection(rejection) => rejection.body_text(),
            AppError::Db(e) => {
                tracing::error!("db error: {:?}", e);
                "database error".to_string()
            }
            e if status.is_server_error() => {
                tracing::error!("request failed: {}", e);
                e.to_string()
            }
            e => e.to_string(),
        };
        let body = Envelope::<()>::failure(status.as_u16(), msg);
        (status, axum::Json(body)).into_response()
    }
}

/// Json extractor whose rejection is reported through [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
