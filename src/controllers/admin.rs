use axum::{
    extract::State,
    response::Html,
    routing::get,
    Router,
};
use std::sync::Arc;

use super::render_page;
use crate::{error::AppError, middleware::AdminUser, services::render::layouts, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(admin_index))
}

async fn admin_index(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
) -> Result<Html<String>, AppError> {
    render_page(
        &state,
        layouts::ADMIN_INDEX,
        &serde_json::json!({ "user": user.display_name() }),
    )
}
