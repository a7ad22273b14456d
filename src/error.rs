use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    services::{auth::AuthError, render::RenderError},
    store::StoreError,
    validation::ValidationError,
};

#[derive(Debug, Error)]
pub enum AppError {
    /// Анонимный пользователь на админской странице: это редирект, а не ошибка.
    #[error("login required, redirecting to {login_url}")]
    AuthRequired { login_url: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("stored datetime is malformed: {0}")]
    Datetime(#[from] chrono::ParseError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthRequired { .. } => StatusCode::FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_)
            | AppError::Render(_)
            | AppError::Auth(_)
            | AppError::Datetime(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Метка для слоя страниц ошибок: какую страницу отрисовать и что записать в лог.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::AuthRequired { login_url } => found(&login_url),
            AppError::Validation(e) => (status, e.to_string()).into_response(),
            other => {
                // Страницу 404/500 рисует middleware::errors, здесь только метка
                let mut response = status.into_response();
                response.extensions_mut().insert(ErrorPage {
                    status,
                    message: other.to_string(),
                });
                response
            }
        }
    }
}

/// 302 Found с заголовком Location и без тела.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
