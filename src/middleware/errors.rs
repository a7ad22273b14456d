//! Страницы ошибок 404/500.
//!
//! `AppError` помечает ответ `ErrorPage`, а этот слой пишет лог и рисует
//! страницу через общий каркас. Если не рисуется даже страница 500, клиент
//! получает простой текст.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, warn};

use crate::{
    error::ErrorPage,
    services::render::{layouts, PageRenderer},
    AppState,
};

pub async fn render_error_pages(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(req).await;

    match response.extensions().get::<ErrorPage>().cloned() {
        Some(page) => respond_error(&state.pages, page.status, &page.message, &client, &path),
        None => response,
    }
}

/// Пишет лог и рисует страницу ошибки. Сама по себе никогда не падает.
pub fn respond_error(
    pages: &PageRenderer,
    status: StatusCode,
    message: &str,
    client: &str,
    path: &str,
) -> Response {
    if status == StatusCode::NOT_FOUND {
        warn!("client {} tried to request {}", client, path);
        return match pages.render(layouts::NOT_FOUND, &()) {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(e) => respond_error(pages, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string(), client, path),
        };
    }

    error!(
        "an internal server error occurred when {} requested {} with error: {}",
        client, path, message
    );
    match pages.render(layouts::INTERNAL_ERROR, &()) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        // Последний рубеж: без шаблонов и без дальнейших вызовов
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn not_found_renders_the_404_page() {
        let response = respond_error(&PageRenderer::builtin(), StatusCode::NOT_FOUND, "", "1.2.3.4:5", "/nope");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body(response).await;
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("GDG Gig City"));
    }

    #[tokio::test]
    async fn broken_404_page_escalates_to_500() {
        let pages = PageRenderer::from_fragments([("_base", "{{content}}"), ("500", "<h1>500</h1>")]);
        let response = respond_error(&pages, StatusCode::NOT_FOUND, "", "unknown", "/nope");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response).await, "<h1>500</h1>");
    }

    #[tokio::test]
    async fn broken_500_page_falls_back_to_plain_text() {
        let pages = PageRenderer::from_fragments([("_base", "no slot here")]);
        let response = respond_error(&pages, StatusCode::INTERNAL_SERVER_ERROR, "db down", "unknown", "/events");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(response).await.contains("unknown template fragment \"500\""));
    }
}
