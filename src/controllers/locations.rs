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
    models::Location,
    services::render::layouts,
    store::Collection,
    utils::derive_id,
    validation::{validate_required, ValidationError},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/location", get(list_locations))
        .route("/admin/location/add", get(add_location_form).post(create_location))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocationForm {
    pub name: String,
    pub address: String,
    pub details: String,
}

impl LocationForm {
    /// Детали площадки необязательны.
    pub fn into_location(self) -> Result<Location, ValidationError> {
        validate_required(&[
            ("location name", self.name.as_str()),
            ("location address", self.address.as_str()),
        ])?;

        Ok(Location {
            id: derive_id(&self.name),
            name: self.name,
            address: self.address,
            details: self.details,
        })
    }
}

#[derive(Serialize)]
struct LocationsPage<'a> {
    user: &'a str,
    locations: Vec<Location>,
}

// GET /admin/location
async fn list_locations(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
) -> Result<Html<String>, AppError> {
    let locations: Vec<Location> = state
        .store
        .list_recent(Collection::Locations, None, None)
        .await?;

    render_page(
        &state,
        layouts::LOCATIONS,
        &LocationsPage { user: user.display_name(), locations },
    )
}

// GET /admin/location/add
async fn add_location_form(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
) -> Result<Html<String>, AppError> {
    render_page(
        &state,
        layouts::ADD_LOCATION,
        &serde_json::json!({ "user": user.display_name() }),
    )
}

// POST /admin/location/add
async fn create_location(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Form(form): Form<LocationForm>,
) -> Result<Response, AppError> {
    let location = form.into_location()?;
    let key = state.store.create(Collection::Locations, &location).await?;
    info!("{} created location {:?} (key {})", user.email, location.id, key.id);

    Ok(found("/admin/location"))
}
