use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AlbumId, GenreId};

/// A released album in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: String,

    /// Release year.
    pub release_year: Option<i32>,

    pub genre_id: Option<GenreId>,

    /// Mean final score of the approved, live reviews of this album.
    /// `0.0` when there are none.
    pub average_rating: f64,

    /// Number of live likes.
    pub likes_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Album {
    #[must_use]
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AlbumId::new(),
            title: title.into(),
            artist: artist.into(),
            release_year: None,
            genre_id: None,
            average_rating: 0.0,
            likes_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre_id: GenreId) -> Self {
        self.genre_id = Some(genre_id);
        self
    }
}
