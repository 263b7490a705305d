//! Notes: immutable, timestamped free text attached to one animal.
//!
//! Notes are append-only. They disappear only when their animal is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnimalId, Error, NoteId, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub note_id:     NoteId,
  pub animal_id:   AnimalId,
  pub body:        String,
  /// Assigned by the store at insert time.
  pub recorded_at: DateTime<Utc>,
}

/// Reject a body that is empty or only whitespace. The text is kept verbatim.
pub fn validate_body(body: String) -> Result<String> {
  if body.trim().is_empty() {
    return Err(Error::validation("note must not be empty"));
  }
  Ok(body)
}
