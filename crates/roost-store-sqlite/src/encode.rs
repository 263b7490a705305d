//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with microsecond
//! precision, so ordering by the column text is chronological. Birthdays are
//! stored as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use roost_core::{
  animal::{Animal, AnimalSummary, Sex},
  image::{Image, ImageData},
  note::Note,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time, truncated to what the column can hold.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

pub fn encode_sex(s: Sex) -> &'static str { s.as_str() }

pub fn decode_sex(s: &str) -> Result<Sex> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown sex: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSummary::from_row`].
pub const SUMMARY_COLUMNS: &str = "
  a.animal_id, a.name, a.species, a.sex, a.birthday,
  (SELECT n.body FROM notes n WHERE n.animal_id = a.animal_id
    ORDER BY n.recorded_at DESC, n.note_id DESC LIMIT 1) AS latest_note,
  (SELECT n.recorded_at FROM notes n WHERE n.animal_id = a.animal_id
    ORDER BY n.recorded_at DESC, n.note_id DESC LIMIT 1) AS latest_note_at,
  i.media_type, i.data";

/// Joins each animal to its primary image; the unique partial index keeps
/// this to at most one row per animal.
pub const SUMMARY_FROM: &str = "
  FROM animals a
  LEFT JOIN images i ON i.animal_id = a.animal_id AND i.is_primary = 1";

/// Raw values read from an `animals` row plus its derived columns.
pub struct RawSummary {
  pub animal_id:      i64,
  pub name:           String,
  pub species:        Option<String>,
  pub sex:            Option<String>,
  pub birthday:       Option<String>,
  pub latest_note:    Option<String>,
  pub latest_note_at: Option<String>,
  pub media_type:     Option<String>,
  pub data:           Option<Vec<u8>>,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      animal_id:      row.get(0)?,
      name:           row.get(1)?,
      species:        row.get(2)?,
      sex:            row.get(3)?,
      birthday:       row.get(4)?,
      latest_note:    row.get(5)?,
      latest_note_at: row.get(6)?,
      media_type:     row.get(7)?,
      data:           row.get(8)?,
    })
  }

  pub fn into_summary(self) -> Result<AnimalSummary> {
    let animal = Animal {
      animal_id: self.animal_id,
      name:      self.name,
      species:   self.species,
      sex:       self.sex.as_deref().map(decode_sex).transpose()?,
      birthday:  self.birthday.as_deref().map(decode_date).transpose()?,
    };

    let primary_image = match (self.media_type, self.data) {
      (Some(media_type), Some(bytes)) => Some(ImageData { media_type, bytes }),
      _ => None,
    };

    Ok(AnimalSummary {
      animal,
      latest_note: self.latest_note,
      latest_note_at: self.latest_note_at.as_deref().map(decode_dt).transpose()?,
      primary_image,
    })
  }
}

/// Raw values read from a `notes` row.
pub struct RawNote {
  pub note_id:     i64,
  pub animal_id:   i64,
  pub body:        String,
  pub recorded_at: String,
}

impl RawNote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:     row.get(0)?,
      animal_id:   row.get(1)?,
      body:        row.get(2)?,
      recorded_at: row.get(3)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      note_id:     self.note_id,
      animal_id:   self.animal_id,
      body:        self.body,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw values read from an `images` row.
pub struct RawImage {
  pub image_id:    i64,
  pub animal_id:   i64,
  pub caption:     Option<String>,
  pub recorded_at: String,
  pub is_primary:  bool,
  pub media_type:  String,
  pub data:        Vec<u8>,
}

impl RawImage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      image_id:    row.get(0)?,
      animal_id:   row.get(1)?,
      caption:     row.get(2)?,
      recorded_at: row.get(3)?,
      is_primary:  row.get(4)?,
      media_type:  row.get(5)?,
      data:        row.get(6)?,
    })
  }

  pub fn into_image(self) -> Result<Image> {
    Ok(Image {
      image_id:    self.image_id,
      animal_id:   self.animal_id,
      caption:     self.caption,
      recorded_at: decode_dt(&self.recorded_at)?,
      is_primary:  self.is_primary,
      data:        ImageData { media_type: self.media_type, bytes: self.data },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = decode_dt("2024-05-01T10:00:00Z").unwrap();
    let b = decode_dt("2024-05-01T10:00:00.5Z").unwrap();
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2024-05-01T10:00:00.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
  }

  #[test]
  fn now_survives_a_roundtrip() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn unknown_sex_is_a_decode_error() {
    assert!(matches!(decode_sex("capon"), Err(Error::Decode(_))));
  }
}
