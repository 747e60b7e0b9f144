use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AlbumId, TrackId};

/// A single track, optionally part of an album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub album_id: Option<AlbumId>,
    pub title: String,
    pub artist: String,

    /// Duration in seconds.
    pub duration_secs: Option<i64>,

    /// Mean final score of the approved, live reviews of this track.
    pub average_rating: f64,

    pub likes_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Track {
    #[must_use]
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TrackId::new(),
            album_id: None,
            title: title.into(),
            artist: artist.into(),
            duration_secs: None,
            average_rating: 0.0,
            likes_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn on_album(mut self, album_id: AlbumId) -> Self {
        self.album_id = Some(album_id);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, secs: i64) -> Self {
        self.duration_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_builder() {
        let album = AlbumId::new();
        let track = Track::new("N.Y. State of Mind", "Nas")
            .on_album(album)
            .with_duration(294);
        assert_eq!(track.album_id, Some(album));
        assert_eq!(track.duration_secs, Some(294));
    }
}
