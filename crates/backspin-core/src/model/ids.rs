use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0.to_string()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let raw = value.as_str()?;
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

define_id!(UserId, "Unique identifier for a registered user.");
define_id!(GenreId, "Unique identifier for a genre.");
define_id!(AlbumId, "Unique identifier for an album.");
define_id!(TrackId, "Unique identifier for a track.");
define_id!(ReviewId, "Unique identifier for a review.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_id_generation() {
        let id1 = ReviewId::new();
        let id2 = ReviewId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_album_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = AlbumId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_id_parse_display() {
        let id = TrackId::new();
        let parsed: TrackId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<TrackId>().is_err());
    }

    #[test]
    fn test_id_sql_round_trip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let id = UserId::new();
        let back: UserId = conn
            .query_row("SELECT ?1", [id], |row| row.get(0))
            .unwrap();
        assert_eq!(back, id);
    }
}
