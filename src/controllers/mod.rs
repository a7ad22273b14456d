pub mod pages;
pub mod admin;
pub mod events;
pub mod locations;
pub mod learning;

use axum::{response::Html, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::{config::FeatureFlags, error::AppError, services::render::Layout, AppState};

pub fn routes(features: &FeatureFlags) -> Router<Arc<AppState>> {
    let router = Router::new()
        .merge(pages::routes())
        .merge(admin::routes())
        .merge(events::routes())
        .merge(locations::routes());

    if features.enable_learning {
        router.merge(learning::routes())
    } else {
        router
    }
}

/// Рисует страницу по списку фрагментов.
pub(crate) fn render_page<C: Serialize + ?Sized>(
    state: &AppState,
    layout: Layout,
    context: &C,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.render(layout, context)?))
}
