//! [`SqliteStore`], the SQLite implementation of [`AnimalStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use roost_core::{
  AnimalId, ImageId, NoteId,
  animal::{AnimalSummary, FlockStats, NewAnimal},
  image::{Image, ImageData, NewImage},
  note::{Note, validate_body},
  store::AnimalStore,
};

use crate::{
  Error, Result,
  encode::{
    RawImage, RawNote, RawSummary, SUMMARY_COLUMNS, SUMMARY_FROM, encode_date, encode_dt,
    encode_sex, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roost store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection thread, which serialises every read and write.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the connection, flushing anything SQLite still holds.
  ///
  /// Other clones of this store fail with a database error afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_summaries(&self, id: Option<AnimalId>) -> Result<Vec<AnimalSummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(id) = id {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} {SUMMARY_FROM} WHERE a.animal_id = ?1"
          ))?;
          stmt
            .query_map(rusqlite::params![id], RawSummary::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} {SUMMARY_FROM} ORDER BY a.animal_id"
          ))?;
          stmt
            .query_map([], RawSummary::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }
}

/// Read an image file in full. Runs before any write is issued, so a missing
/// file never leaves rows behind.
async fn read_image(path: &Path) -> Result<ImageData> {
  let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
    path: path.to_owned(),
    source,
  })?;
  if bytes.is_empty() {
    return Err(
      roost_core::Error::validation(format!("image file {} is empty", path.display())).into(),
    );
  }
  Ok(ImageData::sniff(bytes))
}

fn animal_exists(conn: &rusqlite::Connection, id: AnimalId) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM animals WHERE animal_id = ?1",
        rusqlite::params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.filter(|s| !s.trim().is_empty())
}

// ─── AnimalStore impl ────────────────────────────────────────────────────────

impl AnimalStore for SqliteStore {
  type Error = Error;

  // ── Animals ───────────────────────────────────────────────────────────────

  async fn create_animal(&self, input: NewAnimal) -> Result<AnimalId> {
    let input = input.validate()?;

    let photo = match &input.photo {
      Some(p) => Some((read_image(&p.path).await?, non_blank(p.caption.clone()))),
      None => None,
    };

    let name         = input.name;
    let species      = input.species;
    let sex_str      = input.sex.map(encode_sex);
    let birthday_str = input.birthday.map(encode_date);
    let note         = input.note;
    let at_str       = encode_dt(now());

    let animal_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO animals (name, species, sex, birthday, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![name, species, sex_str, birthday_str, at_str],
        )?;
        let animal_id = tx.last_insert_rowid();

        if let Some(body) = note {
          tx.execute(
            "INSERT INTO notes (animal_id, body, recorded_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![animal_id, body, at_str],
          )?;
        }

        if let Some((data, caption)) = photo {
          tx.execute(
            "INSERT INTO images (animal_id, data, media_type, caption, recorded_at, is_primary)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            rusqlite::params![animal_id, data.bytes, data.media_type, caption, at_str],
          )?;
        }

        tx.commit()?;
        Ok(animal_id)
      })
      .await?;

    tracing::debug!(animal_id, "created animal");
    Ok(animal_id)
  }

  async fn list_animals(&self) -> Result<Vec<AnimalSummary>> {
    self.query_summaries(None).await
  }

  async fn get_animal(&self, id: AnimalId) -> Result<Option<AnimalSummary>> {
    Ok(self.query_summaries(Some(id)).await?.into_iter().next())
  }

  /// Children are removed before the parent, all in one transaction.
  async fn delete_animal(&self, id: AnimalId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let notes = tx.execute(
          "DELETE FROM notes WHERE animal_id = ?1",
          rusqlite::params![id],
        )?;
        let images = tx.execute(
          "DELETE FROM images WHERE animal_id = ?1",
          rusqlite::params![id],
        )?;
        let animals = tx.execute(
          "DELETE FROM animals WHERE animal_id = ?1",
          rusqlite::params![id],
        )?;
        if animals == 0 {
          return Ok(None);
        }
        tx.commit()?;
        Ok(Some((notes, images)))
      })
      .await?;

    let (notes, images) = deleted.ok_or(roost_core::Error::AnimalNotFound(id))?;
    tracing::debug!(animal_id = id, notes, images, "deleted animal");
    Ok(())
  }

  async fn flock_stats(&self) -> Result<FlockStats> {
    let (total, hens, roosters, unknown): (i64, i64, i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM(sex = 'hen'), 0),
                  COALESCE(SUM(sex = 'rooster'), 0),
                  COALESCE(SUM(sex IS NULL), 0)
           FROM animals",
          [],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?)
      })
      .await?;

    Ok(FlockStats {
      total:    total.unsigned_abs(),
      hens:     hens.unsigned_abs(),
      roosters: roosters.unsigned_abs(),
      unknown:  unknown.unsigned_abs(),
    })
  }

  // ── Notes ─────────────────────────────────────────────────────────────────

  async fn add_note(&self, animal_id: AnimalId, body: String) -> Result<Note> {
    let body        = validate_body(body)?;
    let recorded_at = now();
    let at_str      = encode_dt(recorded_at);
    let body_sql    = body.clone();

    let note_id: Option<NoteId> = self
      .conn
      .call(move |conn| {
        if !animal_exists(conn, animal_id)? {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO notes (animal_id, body, recorded_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![animal_id, body_sql, at_str],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let note_id = note_id.ok_or(roost_core::Error::AnimalNotFound(animal_id))?;
    tracing::debug!(animal_id, note_id, "added note");
    Ok(Note { note_id, animal_id, body, recorded_at })
  }

  async fn list_notes(&self, animal_id: AnimalId) -> Result<Vec<Note>> {
    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT note_id, animal_id, body, recorded_at
           FROM notes
           WHERE animal_id = ?1
           ORDER BY recorded_at DESC, note_id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![animal_id], RawNote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNote::into_note).collect()
  }

  // ── Images ────────────────────────────────────────────────────────────────

  async fn add_image(&self, animal_id: AnimalId, input: NewImage) -> Result<ImageId> {
    let data    = read_image(&input.path).await?;
    let caption = non_blank(input.caption);
    let force   = input.primary;
    let at_str  = encode_dt(now());

    let inserted: Option<(ImageId, bool)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !animal_exists(&tx, animal_id)? {
          return Ok(None);
        }

        let existing: i64 = tx.query_row(
          "SELECT COUNT(*) FROM images WHERE animal_id = ?1",
          rusqlite::params![animal_id],
          |r| r.get(0),
        )?;
        let primary = force || existing == 0;

        if primary {
          tx.execute(
            "UPDATE images SET is_primary = 0 WHERE animal_id = ?1 AND is_primary = 1",
            rusqlite::params![animal_id],
          )?;
        }

        tx.execute(
          "INSERT INTO images (animal_id, data, media_type, caption, recorded_at, is_primary)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![animal_id, data.bytes, data.media_type, caption, at_str, primary],
        )?;
        let image_id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some((image_id, primary)))
      })
      .await?;

    let (image_id, primary) = inserted.ok_or(roost_core::Error::AnimalNotFound(animal_id))?;
    tracing::debug!(animal_id, image_id, primary, "added image");
    Ok(image_id)
  }

  async fn list_images(&self, animal_id: AnimalId) -> Result<Vec<Image>> {
    let raws: Vec<RawImage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT image_id, animal_id, caption, recorded_at, is_primary, media_type, data
           FROM images
           WHERE animal_id = ?1
           ORDER BY recorded_at DESC, image_id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![animal_id], RawImage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawImage::into_image).collect()
  }

  async fn primary_image(&self, animal_id: AnimalId) -> Result<Option<ImageData>> {
    let data = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT media_type, data FROM images WHERE animal_id = ?1 AND is_primary = 1",
              rusqlite::params![animal_id],
              |r| Ok(ImageData { media_type: r.get(0)?, bytes: r.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(data)
  }

  /// Clears the flag across the animal's images, then sets it on `image_id`,
  /// inside one transaction.
  async fn set_primary_image(&self, image_id: ImageId, animal_id: AnimalId) -> Result<()> {
    let owner: Option<AnimalId> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let owner: Option<AnimalId> = tx
          .query_row(
            "SELECT animal_id FROM images WHERE image_id = ?1",
            rusqlite::params![image_id],
            |r| r.get(0),
          )
          .optional()?;
        if owner != Some(animal_id) {
          return Ok(owner);
        }

        tx.execute(
          "UPDATE images SET is_primary = 0 WHERE animal_id = ?1",
          rusqlite::params![animal_id],
        )?;
        tx.execute(
          "UPDATE images SET is_primary = 1 WHERE image_id = ?1",
          rusqlite::params![image_id],
        )?;
        tx.commit()?;
        Ok(owner)
      })
      .await?;

    match owner {
      None => Err(roost_core::Error::ImageNotFound(image_id).into()),
      Some(owner) if owner != animal_id => Err(
        roost_core::Error::validation(format!(
          "image {image_id} belongs to animal {owner}, not {animal_id}"
        ))
        .into(),
      ),
      Some(_) => {
        tracing::debug!(animal_id, image_id, "set primary image");
        Ok(())
      }
    }
  }

  async fn delete_image(&self, image_id: ImageId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM images WHERE image_id = ?1",
          rusqlite::params![image_id],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(roost_core::Error::ImageNotFound(image_id).into());
    }
    tracing::debug!(image_id, "deleted image");
    Ok(())
  }
}
