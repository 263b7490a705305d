//! Handlers for `/animals/{id}/notes`.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use roost_core::{AnimalId, note::Note, store::AnimalStore};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

/// `GET /animals/{id}/notes`, newest first.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  ApiPath(animal_id): ApiPath<AnimalId>,
) -> Result<Json<Vec<Note>>, ApiError>
where
  S: AnimalStore,
{
  let notes = store
    .list_notes(animal_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(notes))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddBody {
  pub note: String,
}

/// `POST /animals/{id}/notes` with body `{"note":"..."}`; returns 201 + note.
pub async fn add<S>(
  State(store): State<Arc<S>>,
  ApiPath(animal_id): ApiPath<AnimalId>,
  ApiJson(body): ApiJson<AddBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnimalStore,
{
  let note = store
    .add_note(animal_id, body.note)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(note)))
}
