//! Core types and trait definitions for the Roost flock tracker.
//!
//! No HTTP or database code lives here. Backends implement
//! [`store::AnimalStore`]; the API crate consumes it.

pub mod animal;
pub mod error;
pub mod image;
pub mod note;
pub mod store;

pub use error::{Classify, Error, ErrorKind, Result};

/// Integer surrogate key of an animal, assigned by the store.
pub type AnimalId = i64;

/// Integer surrogate key of a note.
pub type NoteId = i64;

/// Integer surrogate key of an image.
pub type ImageId = i64;
