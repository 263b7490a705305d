//! The `AnimalStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roost-store-sqlite`).
//! Higher layers (`roost-api`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  AnimalId, ImageId,
  animal::{AnimalSummary, FlockStats, NewAnimal},
  error::Classify,
  image::{Image, ImageData, NewImage},
  note::Note,
};

/// Abstraction over a Roost storage backend.
///
/// Every method is one logical operation: either all of its writes land or
/// none do. Notes are append-only. At most one image per animal is primary.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait AnimalStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Animals ───────────────────────────────────────────────────────────

  /// Persist a new animal, plus its optional initial note and photo, and
  /// return its id. The photo, if any, becomes the primary image.
  fn create_animal(
    &self,
    input: NewAnimal,
  ) -> impl Future<Output = Result<AnimalId, Self::Error>> + Send + '_;

  /// Every animal in insertion order, with its latest note and primary image.
  fn list_animals(
    &self,
  ) -> impl Future<Output = Result<Vec<AnimalSummary>, Self::Error>> + Send + '_;

  /// A single animal view. Returns `None` if not found.
  fn get_animal(
    &self,
    id: AnimalId,
  ) -> impl Future<Output = Result<Option<AnimalSummary>, Self::Error>> + Send + '_;

  /// Remove an animal together with all of its notes and images.
  fn delete_animal(
    &self,
    id: AnimalId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Headcounts by sex.
  fn flock_stats(&self) -> impl Future<Output = Result<FlockStats, Self::Error>> + Send + '_;

  // ── Notes ─────────────────────────────────────────────────────────────

  /// Append a note to an animal. The timestamp is set by the store.
  fn add_note(
    &self,
    animal_id: AnimalId,
    body: String,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// All notes for an animal, newest first. Empty if there are none.
  fn list_notes(
    &self,
    animal_id: AnimalId,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  // ── Images ────────────────────────────────────────────────────────────

  /// Read the file behind `input.path` and store it for `animal_id`.
  ///
  /// The image becomes primary if `input.primary` is set or if the animal
  /// has no images yet.
  fn add_image(
    &self,
    animal_id: AnimalId,
    input: NewImage,
  ) -> impl Future<Output = Result<ImageId, Self::Error>> + Send + '_;

  /// All images for an animal, newest first.
  fn list_images(
    &self,
    animal_id: AnimalId,
  ) -> impl Future<Output = Result<Vec<Image>, Self::Error>> + Send + '_;

  /// The primary image payload, or `None` if no image is primary.
  fn primary_image(
    &self,
    animal_id: AnimalId,
  ) -> impl Future<Output = Result<Option<ImageData>, Self::Error>> + Send + '_;

  /// Make `image_id` the sole primary image of `animal_id`.
  ///
  /// Fails if the image does not belong to that animal.
  fn set_primary_image(
    &self,
    image_id: ImageId,
    animal_id: AnimalId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove one image. Deleting the primary image does not promote another.
  fn delete_image(
    &self,
    image_id: ImageId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
