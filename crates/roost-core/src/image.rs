//! Image types.
//!
//! Image payloads are kept as raw bytes all the way through the store. Turning
//! them into something a UI can display is the boundary layer's job.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{AnimalId, ImageId};

/// Media type used when the payload's format cannot be recognised.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A binary payload together with its sniffed media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
  pub media_type: String,
  pub bytes:      Vec<u8>,
}

impl ImageData {
  /// Wrap `bytes`, detecting the media type from its magic number.
  pub fn sniff(bytes: Vec<u8>) -> Self {
    let media_type = infer::get(&bytes)
      .map(|kind| kind.mime_type())
      .unwrap_or(FALLBACK_MEDIA_TYPE)
      .to_owned();
    Self { media_type, bytes }
  }
}

/// A persisted image.
#[derive(Debug, Clone)]
pub struct Image {
  pub image_id:    ImageId,
  pub animal_id:   AnimalId,
  pub caption:     Option<String>,
  pub recorded_at: DateTime<Utc>,
  pub is_primary:  bool,
  pub data:        ImageData,
}

/// Input for [`AnimalStore::add_image`](crate::store::AnimalStore::add_image).
///
/// Only the bytes behind `path` are persisted, never the path itself.
#[derive(Debug, Clone)]
pub struct NewImage {
  pub path:    PathBuf,
  pub caption: Option<String>,
  /// Make this the primary image even if the animal already has one.
  pub primary: bool,
}

impl NewImage {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), caption: None, primary: false }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sniff_recognises_png() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    assert_eq!(ImageData::sniff(png).media_type, "image/png");
  }

  #[test]
  fn sniff_falls_back_for_unknown_bytes() {
    let data = ImageData::sniff(b"not an image".to_vec());
    assert_eq!(data.media_type, FALLBACK_MEDIA_TYPE);
  }
}
