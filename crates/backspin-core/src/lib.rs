//! Core domain model for backspin.
//!
//! This crate defines the catalog entities (albums, tracks, genres, users),
//! the review and reaction models, the review score formula, the SQLite
//! schema and the transactional store the engine runs its operations
//! against.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;
pub mod score;

pub use error::{Error, Result};
