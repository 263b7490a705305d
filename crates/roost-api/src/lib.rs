//! JSON API for Roost.
//!
//! This is the call boundary between a UI and the store: one request is one
//! store operation, answered by one JSON result or one `{"error": ...}`
//! rejection. Image bytes leave the API as `data:` URIs.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roost_api::api_router(store.clone()))
//! ```

pub mod animals;
pub mod encode;
pub mod error;
pub mod extract;
pub mod images;
pub mod notes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, put},
};
use roost_core::store::AnimalStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AnimalStore + 'static,
{
  Router::new()
    // Animals
    .route("/animals", get(animals::list::<S>).post(animals::create::<S>))
    .route(
      "/animals/{id}",
      get(animals::get_one::<S>).delete(animals::delete_one::<S>),
    )
    .route("/stats", get(animals::stats::<S>))
    // Notes
    .route("/animals/{id}/notes", get(notes::list::<S>).post(notes::add::<S>))
    // Images
    .route("/animals/{id}/images", get(images::list::<S>).post(images::add::<S>))
    .route("/animals/{id}/images/primary", get(images::primary::<S>))
    .route(
      "/animals/{id}/images/{image_id}/primary",
      put(images::set_primary::<S>),
    )
    .route("/images/{id}", delete(images::delete_one::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use roost_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 9, 9];

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  fn png_file(dir: &TempDir, name: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, PNG).unwrap();
    path.to_string_lossy().into_owned()
  }

  // ── Animals ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_list_animal() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({
        "name": "Henrietta",
        "species": "Silkie",
        "sex": "hen",
        "birthday": "2023-04-01",
        "notes": "Arrived today"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, list) = send(&app, "GET", "/animals", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["name"], "Henrietta");
    assert_eq!(list[0]["sex"], "hen");
    assert_eq!(list[0]["birthday"], "2023-04-01");
    assert_eq!(list[0]["latest_note"], "Arrived today");
    assert!(list[0]["age"]["months"].is_number());
    assert!(list[0]["photo"].is_null());
  }

  #[tokio::test]
  async fn empty_name_is_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/animals", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (_, list) = send(&app, "GET", "/animals", None).await;
    assert!(list.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn malformed_sex_is_bad_request() {
    let app = app().await;
    let (status, _) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({ "name": "Odd", "sex": "duck" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn blank_optional_fields_mean_unknown() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({ "name": "Pip", "sex": "", "birthday": "", "notes": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (_, view) = send(&app, "GET", &format!("/animals/{id}"), None).await;
    assert!(view["sex"].is_null());
    assert!(view["birthday"].is_null());
    assert!(view["age"].is_null());
    assert!(view["latest_note"].is_null());
  }

  #[tokio::test]
  async fn create_with_photo_exposes_data_uri() {
    let dir = TempDir::new().unwrap();
    let app = app().await;
    let (_, body) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({ "name": "Snap", "photo_path": png_file(&dir, "snap.png") })),
    )
    .await;
    let id = body["id"].as_i64().unwrap();

    let (_, view) = send(&app, "GET", &format!("/animals/{id}"), None).await;
    assert!(view["photo"].as_str().unwrap().starts_with("data:image/png;base64,"));
  }

  #[tokio::test]
  async fn missing_photo_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let app = app().await;
    let missing = dir.path().join("gone.png");
    let (status, _) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({ "name": "Ghost", "photo_path": missing })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, list) = send(&app, "GET", "/animals", None).await;
    assert!(list.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn camel_case_photo_path_is_stored() {
    let dir = TempDir::new().unwrap();
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({ "name": "Camel", "photoPath": png_file(&dir, "camel.png") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (_, view) = send(&app, "GET", &format!("/animals/{id}"), None).await;
    assert!(view["photo"].as_str().unwrap().starts_with("data:image/png;base64,"));
  }

  #[tokio::test]
  async fn unknown_create_field_is_rejected() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({ "name": "Typo", "photo": "/tmp/x.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("photo"));

    let (_, list) = send(&app, "GET", "/animals", None).await;
    assert!(list.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn malformed_json_gets_error_body() {
    let app = app().await;
    let req = Request::builder()
      .method("POST")
      .uri("/animals")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{\"name\": "))
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn non_integer_id_gets_error_body() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/animals/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "PUT", "/animals/1/images/x/primary", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn get_unknown_animal_is_404() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/animals/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_animal_cascades() {
    let dir = TempDir::new().unwrap();
    let app = app().await;
    let (_, body) = send(
      &app,
      "POST",
      "/animals",
      Some(json!({ "name": "Gone", "notes": "bye", "photo_path": png_file(&dir, "g.png") })),
    )
    .await;
    let id = body["id"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/animals/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, notes) = send(&app, "GET", &format!("/animals/{id}/notes"), None).await;
    assert!(notes.as_array().unwrap().is_empty());
    let (_, images) = send(&app, "GET", &format!("/animals/{id}/images"), None).await;
    assert!(images.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &format!("/animals/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn stats_counts_by_sex() {
    let app = app().await;
    for (name, sex) in [("A", "hen"), ("B", "rooster"), ("C", "")] {
      send(&app, "POST", "/animals", Some(json!({ "name": name, "sex": sex }))).await;
    }
    let (status, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "total": 3, "hens": 1, "roosters": 1, "unknown": 1 }));
  }

  // ── Notes ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn notes_round_trip_newest_first() {
    let app = app().await;
    let (_, body) = send(&app, "POST", "/animals", Some(json!({ "name": "N" }))).await;
    let id = body["id"].as_i64().unwrap();

    for note in ["A", "B", "C"] {
      let (status, _) = send(
        &app,
        "POST",
        &format!("/animals/{id}/notes"),
        Some(json!({ "note": note })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (_, notes) = send(&app, "GET", &format!("/animals/{id}/notes"), None).await;
    let bodies: Vec<_> = notes
      .as_array()
      .unwrap()
      .iter()
      .map(|n| n["body"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(bodies, vec!["C", "B", "A"]);
  }

  #[tokio::test]
  async fn note_for_unknown_animal_is_404() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/animals/5/notes", Some(json!({ "note": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Images ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn image_primary_lifecycle() {
    let dir = TempDir::new().unwrap();
    let app = app().await;
    let (_, body) = send(&app, "POST", "/animals", Some(json!({ "name": "I" }))).await;
    let id = body["id"].as_i64().unwrap();

    let (_, none) = send(&app, "GET", &format!("/animals/{id}/images/primary"), None).await;
    assert!(none["data"].is_null());

    let (status, first) = send(
      &app,
      "POST",
      &format!("/animals/{id}/images"),
      Some(json!({ "image_path": png_file(&dir, "1.png") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let first = first["id"].as_i64().unwrap();

    let (_, second) = send(
      &app,
      "POST",
      &format!("/animals/{id}/images"),
      Some(json!({ "image_path": png_file(&dir, "2.png"), "caption": "side" })),
    )
    .await;
    let second = second["id"].as_i64().unwrap();

    let (_, images) = send(&app, "GET", &format!("/animals/{id}/images"), None).await;
    let images = images.as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["id"], second);
    assert_eq!(images[0]["caption"], "side");
    assert_eq!(images[0]["is_primary"], false);
    assert_eq!(images[1]["is_primary"], true);

    let (status, _) = send(
      &app,
      "PUT",
      &format!("/animals/{id}/images/{second}/primary"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, images) = send(&app, "GET", &format!("/animals/{id}/images"), None).await;
    let primaries: Vec<_> = images
      .as_array()
      .unwrap()
      .iter()
      .filter(|i| i["is_primary"] == true)
      .map(|i| i["id"].as_i64().unwrap())
      .collect();
    assert_eq!(primaries, vec![second]);

    let (status, _) = send(&app, "DELETE", &format!("/images/{second}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, none) = send(&app, "GET", &format!("/animals/{id}/images/primary"), None).await;
    assert!(none["data"].is_null());

    let (status, _) = send(&app, "DELETE", &format!("/images/{first}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn camel_case_image_path_is_stored() {
    let dir = TempDir::new().unwrap();
    let app = app().await;
    let (_, body) = send(&app, "POST", "/animals", Some(json!({ "name": "C" }))).await;
    let id = body["id"].as_i64().unwrap();

    let (status, _) = send(
      &app,
      "POST",
      &format!("/animals/{id}/images"),
      Some(json!({ "imagePath": png_file(&dir, "c.png"), "caption": "front" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, images) = send(&app, "GET", &format!("/animals/{id}/images"), None).await;
    assert_eq!(images[0]["caption"], "front");
    assert_eq!(images[0]["is_primary"], true);
  }

  #[tokio::test]
  async fn unreadable_image_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let app = app().await;
    let (_, body) = send(&app, "POST", "/animals", Some(json!({ "name": "U" }))).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
      &app,
      "POST",
      &format!("/animals/{id}/images"),
      Some(json!({ "image_path": dir.path().join("missing.png") })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("missing.png"));
  }
}
