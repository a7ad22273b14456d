use axum::{
    extract::State,
    response::{Html, Response},
    routing::get,
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::render_page;
use crate::{
    error::{found, AppError},
    middleware::AdminUser,
    models::LearnEvent,
    services::render::layouts,
    store::{Collection, Order},
    utils::{derive_id, normalize_for_display},
    validation::{validate_required, ValidationError},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/learning", get(list_study_groups))
        .route("/admin/learning/add", get(add_study_group_form).post(create_study_group))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudyGroupForm {
    pub title: String,
    pub date: String,
    pub location: String,
    pub details: String,
}

impl StudyGroupForm {
    pub fn into_learn_event(self) -> Result<LearnEvent, ValidationError> {
        validate_required(&[
            ("study group title", self.title.as_str()),
            ("study group date and time", self.date.as_str()),
            ("study group location", self.location.as_str()),
            ("study group details", self.details.as_str()),
        ])?;

        Ok(LearnEvent {
            id: derive_id(&self.title),
            title: self.title,
            datetime: self.date,
            loc_id: self.location,
            details: self.details,
        })
    }
}

#[derive(Serialize)]
struct LearningPage {
    groups: Vec<LearnEvent>,
}

// GET /learning
async fn list_study_groups(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let mut groups: Vec<LearnEvent> = state
        .store
        .list_recent(
            Collection::LearnEvents,
            Some(Order::desc("datetime")),
            Some(state.config.site.list_limit),
        )
        .await?;

    for group in &mut groups {
        group.datetime = normalize_for_display(&group.datetime)?;
    }

    render_page(&state, layouts::LEARNING, &LearningPage { groups })
}

// GET /admin/learning/add
async fn add_study_group_form(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
) -> Result<Html<String>, AppError> {
    render_page(
        &state,
        layouts::ADD_LEARNING,
        &serde_json::json!({ "user": user.display_name() }),
    )
}

// POST /admin/learning/add
async fn create_study_group(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Form(form): Form<StudyGroupForm>,
) -> Result<Response, AppError> {
    let group = form.into_learn_event()?;
    let key = state.store.create(Collection::LearnEvents, &group).await?;
    info!("{} created study group {:?} (key {})", user.email, group.id, key.id);

    Ok(found("/learning"))
}
