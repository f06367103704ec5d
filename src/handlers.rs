use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::{Contact, ContactInput, SearchQuery};
use crate::AppState;

pub async fn create_contact(
    State(state): State<AppState>,
    AppJson(input): AppJson<ContactInput>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    input.validate()?;
    let contact = state.store.insert(input).await?;
    info!(id = contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn list_contacts(State(state): State<AppState>) -> Result<Json<Vec<Contact>>, ApiError> {
    Ok(Json(state.store.list_all().await?))
}

pub async fn get_contact(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Contact>, ApiError> {
    state.store.get(id).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn replace_contact(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(input): AppJson<ContactInput>,
) -> Result<Json<Contact>, ApiError> {
    input.validate()?;
    let contact = state.store.replace(id, input).await?.ok_or(ApiError::NotFound)?;
    info!(id, "contact replaced");
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Contact>, ApiError> {
    let contact = state.store.delete(id).await?.ok_or(ApiError::NotFound)?;
    info!(id, "contact deleted");
    Ok(Json(contact))
}

pub async fn search_contacts(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    params.validate()?;
    Ok(Json(state.store.search(&params.query).await?))
}

pub async fn upcoming_birthdays(
    State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let today = state.clock.today();
    Ok(Json(state.store.upcoming_birthdays(today).await?))
}
