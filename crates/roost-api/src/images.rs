//! Handlers for image endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/animals/{id}/images` | Newest first, payloads as `data:` URIs |
//! | `POST`   | `/animals/{id}/images` | Body: [`AddBody`]; returns 201 + `{"id": n}` |
//! | `GET`    | `/animals/{id}/images/primary` | `{"data": <uri or null>}` |
//! | `PUT`    | `/animals/{id}/images/{image_id}/primary` | Promote an image |
//! | `DELETE` | `/images/{id}` | Never promotes a replacement |

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use roost_core::{
  AnimalId, ImageId,
  image::{Image, NewImage},
  store::AnimalStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  encode::data_uri,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

#[derive(Debug, Serialize)]
pub struct ImageView {
  pub id:          ImageId,
  pub animal_id:   AnimalId,
  pub data:        String,
  pub caption:     Option<String>,
  pub recorded_at: DateTime<Utc>,
  pub is_primary:  bool,
}

impl From<Image> for ImageView {
  fn from(i: Image) -> Self {
    ImageView {
      id:          i.image_id,
      animal_id:   i.animal_id,
      data:        data_uri(&i.data),
      caption:     i.caption,
      recorded_at: i.recorded_at,
      is_primary:  i.is_primary,
    }
  }
}

/// `GET /animals/{id}/images`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  ApiPath(animal_id): ApiPath<AnimalId>,
) -> Result<Json<Vec<ImageView>>, ApiError>
where
  S: AnimalStore,
{
  let images = store
    .list_images(animal_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(images.into_iter().map(ImageView::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddBody {
  #[serde(alias = "imagePath")]
  pub image_path: PathBuf,
  pub caption:    Option<String>,
  /// Promote the new image even if another one is already primary.
  #[serde(default)]
  pub primary:    bool,
}

/// `POST /animals/{id}/images`
pub async fn add<S>(
  State(store): State<Arc<S>>,
  ApiPath(animal_id): ApiPath<AnimalId>,
  ApiJson(body): ApiJson<AddBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnimalStore,
{
  let input = NewImage {
    path:    body.image_path,
    caption: body.caption,
    primary: body.primary,
  };
  let id = store
    .add_image(animal_id, input)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `GET /animals/{id}/images/primary`
pub async fn primary<S>(
  State(store): State<Arc<S>>,
  ApiPath(animal_id): ApiPath<AnimalId>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AnimalStore,
{
  let data = store
    .primary_image(animal_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "data": data.as_ref().map(data_uri) })))
}

/// `PUT /animals/{id}/images/{image_id}/primary`
pub async fn set_primary<S>(
  State(store): State<Arc<S>>,
  ApiPath((animal_id, image_id)): ApiPath<(AnimalId, ImageId)>,
) -> Result<StatusCode, ApiError>
where
  S: AnimalStore,
{
  store
    .set_primary_image(image_id, animal_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /images/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  ApiPath(image_id): ApiPath<ImageId>,
) -> Result<StatusCode, ApiError>
where
  S: AnimalStore,
{
  store
    .delete_image(image_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
