//! Animal: the root entity of the store.
//!
//! Notes and images hang off an animal and never outlive it. The list view
//! ([`AnimalSummary`]) is assembled on read from the latest note and the
//! primary image.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnimalId, Error, Result, image::{ImageData, NewImage}};

// ─── Sex ─────────────────────────────────────────────────────────────────────

/// The enumerated sex of a bird. Unknown is modelled as `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
  Hen,
  Rooster,
}

impl Sex {
  pub fn as_str(self) -> &'static str {
    match self {
      Sex::Hen => "hen",
      Sex::Rooster => "rooster",
    }
  }

  /// Parse an optional, caller-supplied value. Blank input means unknown.
  pub fn parse_optional(s: Option<&str>) -> Result<Option<Self>> {
    match s.map(str::trim) {
      None | Some("") => Ok(None),
      Some(v) => v.parse().map(Some),
    }
  }
}

impl FromStr for Sex {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "hen" => Ok(Sex::Hen),
      "rooster" => Ok(Sex::Rooster),
      other => Err(Error::validation(format!(
        "sex must be \"hen\" or \"rooster\", got {other:?}"
      ))),
    }
  }
}

impl fmt::Display for Sex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Animal ──────────────────────────────────────────────────────────────────

/// A persisted animal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
  pub animal_id: AnimalId,
  pub name:      String,
  pub species:   Option<String>,
  pub sex:       Option<Sex>,
  pub birthday:  Option<NaiveDate>,
}

impl Animal {
  /// Age at the instant `now`, or `None` when the birthday is unknown.
  pub fn age_at(&self, now: DateTime<Utc>) -> Option<Age> {
    self.birthday.map(|b| Age::between(b, now))
  }
}

/// Input for [`AnimalStore::create_animal`](crate::store::AnimalStore::create_animal).
///
/// The optional `note` and `photo` are attached in the same write as the
/// animal itself.
#[derive(Debug, Clone, Default)]
pub struct NewAnimal {
  pub name:     String,
  pub species:  Option<String>,
  pub sex:      Option<Sex>,
  pub birthday: Option<NaiveDate>,
  /// Body of an initial note.
  pub note:     Option<String>,
  /// An initial photo; always stored as primary.
  pub photo:    Option<NewImage>,
}

impl NewAnimal {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Default::default() }
  }

  /// Reject an empty name and normalise blank optional text to `None`.
  pub fn validate(mut self) -> Result<Self> {
    self.name = self.name.trim().to_owned();
    if self.name.is_empty() {
      return Err(Error::validation("name must not be empty"));
    }
    self.species = non_blank(self.species);
    self.note = self.note.filter(|n| !n.trim().is_empty());
    if let Some(photo) = self.photo.as_mut() {
      photo.primary = true;
    }
    Ok(self)
  }
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// An animal plus the derived fields shown in list and detail views.
#[derive(Debug, Clone)]
pub struct AnimalSummary {
  pub animal:         Animal,
  /// Body of the most recently recorded note.
  pub latest_note:    Option<String>,
  pub latest_note_at: Option<DateTime<Utc>>,
  pub primary_image:  Option<ImageData>,
}

/// Dashboard counters over the whole flock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlockStats {
  pub total:    u64,
  pub hens:     u64,
  pub roosters: u64,
  pub unknown:  u64,
}

/// Age in 30-day months plus remaining days.
///
/// The birthday counts from midnight UTC and any started day counts as a
/// whole one, so a bird born yesterday is two days old by this afternoon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Age {
  pub months: u32,
  pub days:   u32,
}

impl Age {
  pub fn between(birthday: NaiveDate, now: DateTime<Utc>) -> Self {
    const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

    let born = birthday.and_time(NaiveTime::MIN).and_utc();
    let elapsed = (now - born).num_milliseconds().unsigned_abs();
    let total = u32::try_from(elapsed.div_ceil(MS_PER_DAY)).unwrap_or(u32::MAX);
    Self { months: total / 30, days: total % 30 }
  }
}
