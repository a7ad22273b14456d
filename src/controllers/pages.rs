use axum::{
    extract::State,
    response::Html,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::render_page;
use crate::{error::AppError, services::render::layouts, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .route("/coc", get(code_of_conduct))
}

#[derive(Debug, Serialize)]
struct Organizer {
    name: &'static str,
    role: &'static str,
    email: &'static str,
    google_plus: &'static str,
    irc: &'static str,
}

const ORGANIZERS: &[Organizer] = &[Organizer {
    name: "Adam Jimerson",
    role: "Lead Organizer",
    email: "vendion@gmail.com",
    google_plus: "https://google.com/+AdamJimerson",
    irc: "vendion",
}];

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    render_page(&state, layouts::INDEX, &())
}

async fn about(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    render_page(&state, layouts::ABOUT, &())
}

async fn code_of_conduct(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    render_page(
        &state,
        layouts::COC,
        &serde_json::json!({ "organizers": ORGANIZERS }),
    )
}

/// Всё, что не совпало ни с одним маршрутом.
pub async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
