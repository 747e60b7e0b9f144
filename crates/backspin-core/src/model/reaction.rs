use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::ids::{AlbumId, ReviewId, TrackId, UserId};

/// The kind of entity a review or reaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Album,
    Track,
    Review,
}

impl TargetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Track => "track",
            Self::Review => "review",
        }
    }

    /// The table holding entities of this kind.
    #[must_use]
    pub(crate) const fn table(self) -> &'static str {
        match self {
            Self::Album => "albums",
            Self::Track => "tracks",
            Self::Review => "reviews",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "album" => Ok(Self::Album),
            "track" => Ok(Self::Track),
            "review" => Ok(Self::Review),
            other => Err(Error::InvalidTarget(format!("unknown target kind '{other}'"))),
        }
    }
}

impl ToSql for TargetKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TargetKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(e.to_string().into()))
    }
}

/// Something a user can like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Album(AlbumId),
    Track(TrackId),
    Review(ReviewId),
}

impl ReactionTarget {
    /// Build a target from a kind and a textual id, as received from a
    /// request payload.
    pub fn parse(kind: TargetKind, id: &str) -> Result<Self> {
        let invalid = |e: uuid::Error| Error::InvalidTarget(format!("bad {kind} id '{id}': {e}"));
        Ok(match kind {
            TargetKind::Album => Self::Album(id.parse().map_err(invalid)?),
            TargetKind::Track => Self::Track(id.parse().map_err(invalid)?),
            TargetKind::Review => Self::Review(id.parse().map_err(invalid)?),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Album(_) => TargetKind::Album,
            Self::Track(_) => TargetKind::Track,
            Self::Review(_) => TargetKind::Review,
        }
    }

    #[must_use]
    pub fn id_string(&self) -> String {
        match self {
            Self::Album(id) => id.to_string(),
            Self::Track(id) => id.to_string(),
            Self::Review(id) => id.to_string(),
        }
    }
}

impl fmt::Display for ReactionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id_string())
    }
}

/// A like recorded by an actor on a target.
///
/// At most one live reaction exists per (actor, kind, target). Unliking
/// sets `deleted_at`; the row is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: i64,
    pub actor_id: UserId,
    pub target_kind: TargetKind,
    pub target_id: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Reaction {
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kind_round_trip() {
        for kind in [TargetKind::Album, TargetKind::Track, TargetKind::Review] {
            assert_eq!(kind.as_str().parse::<TargetKind>().unwrap(), kind);
        }
        assert!("artist".parse::<TargetKind>().is_err());
    }

    #[test]
    fn test_reaction_target_parse() {
        let album = AlbumId::new();
        let target = ReactionTarget::parse(TargetKind::Album, &album.to_string()).unwrap();
        assert_eq!(target, ReactionTarget::Album(album));
        assert_eq!(target.kind(), TargetKind::Album);
        assert_eq!(target.id_string(), album.to_string());
    }

    #[test]
    fn test_reaction_target_parse_rejects_garbage() {
        let err = ReactionTarget::parse(TargetKind::Review, "nope").unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
    }
}
