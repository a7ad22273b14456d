use axum::{
    extract::{Path, State},
    response::{Html, Response},
    routing::get,
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::render_page;
use crate::{
    error::{found, AppError},
    middleware::AdminUser,
    models::{Event, Location},
    services::render::layouts,
    store::{Collection, Order},
    utils::{derive_id, normalize_for_display},
    validation::{validate_required, ValidationError},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{event}", get(view_event))
        .route("/admin/events/add", get(add_event_form).post(create_event))
}

// Поля формы; отсутствующее поле приходит пустой строкой
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub date: String,
    pub location: String,
    pub gplus: String,
    pub details: String,
}

impl EventForm {
    pub fn into_event(self) -> Result<Event, ValidationError> {
        validate_required(&[
            ("event title", self.title.as_str()),
            ("event date and time", self.date.as_str()),
            ("event location", self.location.as_str()),
            ("Google+ event page", self.gplus.as_str()),
            ("event details", self.details.as_str()),
        ])?;

        Ok(Event {
            id: derive_id(&self.title),
            title: self.title,
            datetime: self.date,
            loc_id: self.location,
            google_plus: self.gplus,
            details: self.details,
        })
    }
}

#[derive(Serialize)]
struct EventsPage {
    events: Vec<Event>,
}

#[derive(Serialize)]
struct EventPage {
    event: Event,
    location: Location,
}

// GET /events
async fn list_events(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let mut events: Vec<Event> = state
        .store
        .list_recent(
            Collection::Events,
            Some(Order::desc("datetime")),
            Some(state.config.site.list_limit),
        )
        .await?;

    // Хранится как прислал браузер, переформатируем только для вывода
    for event in &mut events {
        event.datetime = normalize_for_display(&event.datetime)?;
    }

    render_page(&state, layouts::EVENTS, &EventsPage { events })
}

// GET /events/{event}
async fn view_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    if event_id.is_empty() {
        return Err(AppError::Internal("no event ID found in URL".to_string()));
    }

    // Не найдено - рисуем пустую карточку, а не 404
    let mut event: Event = state
        .store
        .find_by_field(Collection::Events, "id", &event_id)
        .await?
        .unwrap_or_default();

    let location: Location = state
        .store
        .find_by_field(Collection::Locations, "id", &event.loc_id)
        .await?
        .unwrap_or_default();

    // Одну карточку рисуем как есть, даже если дата не разбирается
    if !event.datetime.is_empty() {
        match normalize_for_display(&event.datetime) {
            Ok(shown) => event.datetime = shown,
            Err(e) => warn!("event {:?} has unparsable datetime {:?}: {}", event.id, event.datetime, e),
        }
    }

    render_page(&state, layouts::VIEW_EVENT, &EventPage { event, location })
}

// GET /admin/events/add
async fn add_event_form(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
) -> Result<Html<String>, AppError> {
    render_page(
        &state,
        layouts::ADD_EVENT,
        &serde_json::json!({ "user": user.display_name() }),
    )
}

// POST /admin/events/add
async fn create_event(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let event = form.into_event()?;
    let key = state.store.create(Collection::Events, &event).await?;
    info!("{} created event {:?} (key {})", user.email, event.id, key.id);

    Ok(found("/events"))
}
