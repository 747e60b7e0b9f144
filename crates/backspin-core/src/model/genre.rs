use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::GenreId;

/// A genre albums can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,

    /// Display name (e.g., "Boom Bap"). Unique across the catalog.
    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl Genre {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GenreId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_new() {
        let genre = Genre::new("Boom Bap");
        assert_eq!(genre.name, "Boom Bap");
    }
}
