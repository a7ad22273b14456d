pub mod errors;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use std::sync::Arc;
use tracing::debug;

use crate::{error::AppError, models::User};

/// Вошедший пользователь для админских страниц.
///
/// Анонимов экстрактор отклоняет редиректом (302) на страницу входа с
/// возвратом на исходный адрес, поэтому тело запроса и сам обработчик
/// до них не доходят.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<crate::AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = state.auth.current_user(&parts.headers).await? {
            return Ok(AdminUser(user));
        }

        // Возвращаемся туда же, включая query string
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);
        let return_path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let login_url = state.auth.login_redirect_url(return_path)?;
        debug!("Anonymous request to {}, redirecting to login", return_path);

        Err(AppError::AuthRequired { login_url })
    }
}
