//! Handlers for `/animals` and `/stats` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/animals` | Every animal with latest note and primary photo |
//! | `POST`   | `/animals` | Body: [`CreateBody`]; returns 201 + `{"id": n}` |
//! | `GET`    | `/animals/{id}` | 404 if not found |
//! | `DELETE` | `/animals/{id}` | Cascades to notes and images |
//! | `GET`    | `/stats` | Headcounts by sex |

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use roost_core::{
  AnimalId,
  animal::{Age, AnimalSummary, FlockStats, NewAnimal, Sex},
  image::NewImage,
  store::AnimalStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  encode::data_uri,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

// ─── View ─────────────────────────────────────────────────────────────────────

/// An animal as the UI sees it.
#[derive(Debug, Serialize)]
pub struct AnimalView {
  pub id:             AnimalId,
  pub name:           String,
  pub species:        Option<String>,
  pub sex:            Option<Sex>,
  pub birthday:       Option<NaiveDate>,
  pub age:            Option<Age>,
  pub latest_note:    Option<String>,
  pub latest_note_at: Option<DateTime<Utc>>,
  /// Primary image as a `data:` URI.
  pub photo:          Option<String>,
}

impl AnimalView {
  fn new(summary: AnimalSummary, now: DateTime<Utc>) -> Self {
    let age = summary.animal.age_at(now);
    Self {
      id: summary.animal.animal_id,
      name: summary.animal.name,
      species: summary.animal.species,
      sex: summary.animal.sex,
      birthday: summary.animal.birthday,
      age,
      latest_note: summary.latest_note,
      latest_note_at: summary.latest_note_at,
      photo: summary.primary_image.as_ref().map(data_uri),
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /animals`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<AnimalView>>, ApiError>
where
  S: AnimalStore,
{
  let now = Utc::now();
  let animals = store.list_animals().await.map_err(ApiError::from_store)?;
  Ok(Json(
    animals
      .into_iter()
      .map(|a| AnimalView::new(a, now))
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /animals`.
///
/// Photo fields also accept their camelCase names. Unknown fields are
/// rejected so a misspelt photo path cannot be dropped.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBody {
  pub name:          String,
  pub species:       Option<String>,
  /// `"hen"`, `"rooster"`, or blank for unknown.
  pub sex:           Option<String>,
  /// `YYYY-MM-DD`, or blank for unknown.
  pub birthday:      Option<String>,
  /// Body of an initial note.
  pub notes:         Option<String>,
  /// Path of an initial photo on the local filesystem.
  #[serde(alias = "photoPath")]
  pub photo_path:    Option<PathBuf>,
  #[serde(alias = "photoCaption")]
  pub photo_caption: Option<String>,
}

impl TryFrom<CreateBody> for NewAnimal {
  type Error = ApiError;

  fn try_from(b: CreateBody) -> Result<Self, ApiError> {
    let sex = Sex::parse_optional(b.sex.as_deref()).map_err(ApiError::from_store)?;
    let birthday = match b.birthday.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(s) => Some(
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
          .map_err(|e| ApiError::BadRequest(format!("invalid birthday {s:?}: {e}")))?,
      ),
    };
    let photo = b.photo_path.map(|path| NewImage {
      caption: b.photo_caption,
      primary: true,
      ..NewImage::new(path)
    });

    Ok(NewAnimal {
      name: b.name,
      species: b.species,
      sex,
      birthday,
      note: b.notes,
      photo,
    })
  }
}

/// `POST /animals`; returns 201 + `{"id": <new id>}`.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnimalStore,
{
  let input = NewAnimal::try_from(body)?;
  let id = store
    .create_animal(input)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /animals/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<AnimalId>,
) -> Result<Json<AnimalView>, ApiError>
where
  S: AnimalStore,
{
  let summary = store
    .get_animal(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("animal {id} not found")))?;
  Ok(Json(AnimalView::new(summary, Utc::now())))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /animals/{id}` removes the animal with its notes and images.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<AnimalId>,
) -> Result<StatusCode, ApiError>
where
  S: AnimalStore,
{
  store.delete_animal(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /stats`
pub async fn stats<S>(State(store): State<Arc<S>>) -> Result<Json<FlockStats>, ApiError>
where
  S: AnimalStore,
{
  let stats = store.flock_stats().await.map_err(ApiError::from_store)?;
  Ok(Json(stats))
}
