//! Error types for `roost-core`.

use thiserror::Error;

use crate::{AnimalId, ImageId};

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was empty or an enumerated value was malformed.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("animal not found: {0}")]
  AnimalNotFound(AnimalId),

  #[error("image not found: {0}")]
  ImageNotFound(ImageId),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// The caller-visible category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Empty required field or malformed enumerated value.
  Validation,
  /// A referenced animal or image does not exist.
  NotFound,
  /// A caller-supplied file could not be read.
  Io,
  /// The storage medium failed (disk, corruption, constraint violation).
  Storage,
}

/// Implemented by backend errors so the call boundary can tell failures apart
/// without knowing the concrete backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Validation(_) => ErrorKind::Validation,
      Error::AnimalNotFound(_) | Error::ImageNotFound(_) => ErrorKind::NotFound,
    }
  }
}
