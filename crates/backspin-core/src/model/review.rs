use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::ids::{AlbumId, ReviewId, TrackId, UserId};
use crate::model::reaction::TargetKind;
use crate::score;

/// What a review is about: exactly one album or exactly one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReviewTarget {
    Album(AlbumId),
    Track(TrackId),
}

impl ReviewTarget {
    /// Build a target from the two optional references a request carries.
    ///
    /// Fails with [`Error::InvalidTarget`] unless exactly one is set.
    pub fn from_parts(album_id: Option<AlbumId>, track_id: Option<TrackId>) -> Result<Self> {
        match (album_id, track_id) {
            (Some(album), None) => Ok(Self::Album(album)),
            (None, Some(track)) => Ok(Self::Track(track)),
            (Some(_), Some(_)) => Err(Error::InvalidTarget(
                "a review targets an album or a track, not both".to_string(),
            )),
            (None, None) => Err(Error::InvalidTarget(
                "a review must target an album or a track".to_string(),
            )),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Album(_) => TargetKind::Album,
            Self::Track(_) => TargetKind::Track,
        }
    }

    #[must_use]
    pub const fn album_id(&self) -> Option<AlbumId> {
        match self {
            Self::Album(id) => Some(*id),
            Self::Track(_) => None,
        }
    }

    #[must_use]
    pub const fn track_id(&self) -> Option<TrackId> {
        match self {
            Self::Album(_) => None,
            Self::Track(id) => Some(*id),
        }
    }

    #[must_use]
    pub fn id_string(&self) -> String {
        match self {
            Self::Album(id) => id.to_string(),
            Self::Track(id) => id.to_string(),
        }
    }
}

impl fmt::Display for ReviewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id_string())
    }
}

/// Moderation status of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::InvalidData(format!("unknown review status '{other}'"))),
        }
    }
}

impl ToSql for ReviewStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ReviewStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(e.to_string().into()))
    }
}

/// An admin's verdict on a pending review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    #[must_use]
    pub const fn status(self) -> ReviewStatus {
        match self {
            Self::Approve => ReviewStatus::Approved,
            Self::Reject => ReviewStatus::Rejected,
        }
    }
}

/// The four bounded ratings of a review. Each must be in `1..=10`;
/// [`score::compute`] enforces the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub rhymes: u8,
    pub structure: u8,
    pub implementation: u8,
    pub individuality: u8,
}

impl Ratings {
    #[must_use]
    pub const fn new(rhymes: u8, structure: u8, implementation: u8, individuality: u8) -> Self {
        Self {
            rhymes,
            structure,
            implementation,
            individuality,
        }
    }

    /// Field names paired with their values, in declaration order.
    #[must_use]
    pub const fn fields(&self) -> [(&'static str, u8); 4] {
        [
            ("rhymes", self.rhymes),
            ("structure", self.structure),
            ("implementation", self.implementation),
            ("individuality", self.individuality),
        ]
    }
}

/// Content changes an author requests. `None` leaves a field untouched.
///
/// The target is deliberately absent: it is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEdit {
    pub ratings: Option<Ratings>,
    pub atmosphere: Option<u8>,
    pub text: Option<String>,
}

impl ReviewEdit {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ratings.is_none() && self.atmosphere.is_none() && self.text.is_none()
    }
}

/// A user-submitted review of an album or a track.
///
/// The score fields and the moderation fields are only written by
/// [`Review::new`], [`Review::apply_edit`] and [`Review::moderate`], so
/// `final_score` always matches the ratings and `moderator_id` is only set
/// on a moderated review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    id: ReviewId,
    author_id: UserId,
    target: ReviewTarget,
    ratings: Ratings,
    atmosphere: u8,
    atmosphere_multiplier: f64,
    final_score: i64,
    text: String,
    status: ReviewStatus,
    moderator_id: Option<UserId>,
    moderated_at: Option<DateTime<Utc>>,
    likes_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Create a pending review, validating the ratings and computing the
    /// score.
    pub fn new(
        author_id: UserId,
        target: ReviewTarget,
        ratings: Ratings,
        atmosphere: u8,
        text: impl Into<String>,
    ) -> Result<Self> {
        let score = score::compute(&ratings, atmosphere)?;
        let now = Utc::now();
        Ok(Self {
            id: ReviewId::new(),
            author_id,
            target,
            ratings,
            atmosphere,
            atmosphere_multiplier: score.multiplier,
            final_score: score.final_score,
            text: text.into(),
            status: ReviewStatus::Pending,
            moderator_id: None,
            moderated_at: None,
            likes_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Apply an author's content edit.
    ///
    /// The new score is computed before anything changes, so an invalid
    /// rating leaves the review untouched. Any non-empty edit returns the
    /// review to `Pending` and clears the moderator fields. Returns `false`
    /// for an empty edit.
    pub fn apply_edit(&mut self, edit: &ReviewEdit, now: DateTime<Utc>) -> Result<bool> {
        if edit.is_empty() {
            return Ok(false);
        }

        let ratings = edit.ratings.unwrap_or(self.ratings);
        let atmosphere = edit.atmosphere.unwrap_or(self.atmosphere);
        let score = score::compute(&ratings, atmosphere)?;

        self.ratings = ratings;
        self.atmosphere = atmosphere;
        self.atmosphere_multiplier = score.multiplier;
        self.final_score = score.final_score;
        if let Some(text) = &edit.text {
            self.text.clone_from(text);
        }
        self.status = ReviewStatus::Pending;
        self.moderator_id = None;
        self.moderated_at = None;
        self.updated_at = now;
        Ok(true)
    }

    /// Record a moderation decision. Only a pending review can be
    /// moderated.
    pub fn moderate(
        &mut self,
        moderator: UserId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let to = decision.status();
        if self.status != ReviewStatus::Pending {
            return Err(Error::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.moderator_id = Some(moderator);
        self.moderated_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Mark the review as logically removed.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    #[must_use]
    pub const fn id(&self) -> ReviewId {
        self.id
    }

    #[must_use]
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    #[must_use]
    pub const fn target(&self) -> ReviewTarget {
        self.target
    }

    #[must_use]
    pub const fn ratings(&self) -> Ratings {
        self.ratings
    }

    #[must_use]
    pub const fn atmosphere(&self) -> u8 {
        self.atmosphere
    }

    #[must_use]
    pub const fn atmosphere_multiplier(&self) -> f64 {
        self.atmosphere_multiplier
    }

    #[must_use]
    pub const fn final_score(&self) -> i64 {
        self.final_score
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn status(&self) -> ReviewStatus {
        self.status
    }

    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self.status, ReviewStatus::Approved)
    }

    #[must_use]
    pub const fn moderator_id(&self) -> Option<UserId> {
        self.moderator_id
    }

    #[must_use]
    pub const fn moderated_at(&self) -> Option<DateTime<Utc>> {
        self.moderated_at
    }

    #[must_use]
    pub const fn likes_count(&self) -> i64 {
        self.likes_count
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Decode a `reviews` row selected with the store's review column list.
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        use crate::schema::{optional_timestamp, timestamp};

        let album_id: Option<AlbumId> = row.get(2)?;
        let track_id: Option<TrackId> = row.get(3)?;
        let target = ReviewTarget::from_parts(album_id, track_id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                e.to_string().into(),
            )
        })?;

        Ok(Self {
            id: row.get(0)?,
            author_id: row.get(1)?,
            target,
            ratings: Ratings::new(row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?),
            atmosphere: row.get(8)?,
            atmosphere_multiplier: row.get(9)?,
            final_score: row.get(10)?,
            text: row.get(11)?,
            status: row.get(12)?,
            moderator_id: row.get(13)?,
            moderated_at: optional_timestamp(row, 14)?,
            likes_count: row.get(15)?,
            created_at: timestamp(row, 16)?,
            updated_at: timestamp(row, 17)?,
            deleted_at: optional_timestamp(row, 18)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_review() -> Review {
        Review::new(
            UserId::new(),
            ReviewTarget::Album(AlbumId::new()),
            Ratings::new(7, 8, 6, 9),
            6,
            "solid",
        )
        .unwrap()
    }

    #[test]
    fn test_target_from_parts() {
        let album = AlbumId::new();
        let track = TrackId::new();
        assert_eq!(
            ReviewTarget::from_parts(Some(album), None).unwrap(),
            ReviewTarget::Album(album)
        );
        assert_eq!(
            ReviewTarget::from_parts(None, Some(track)).unwrap(),
            ReviewTarget::Track(track)
        );
        assert!(matches!(
            ReviewTarget::from_parts(Some(album), Some(track)),
            Err(Error::InvalidTarget(_))
        ));
        assert!(matches!(
            ReviewTarget::from_parts(None, None),
            Err(Error::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_new_review_is_pending_with_score() {
        let review = pending_review();
        assert_eq!(review.status(), ReviewStatus::Pending);
        assert!(review.moderator_id().is_none());
        assert!(review.moderated_at().is_none());
        let expected = score::compute(&Ratings::new(7, 8, 6, 9), 6).unwrap();
        assert_eq!(review.final_score(), expected.final_score);
        assert!((review.atmosphere_multiplier() - expected.multiplier).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_review_rejects_bad_rating() {
        let err = Review::new(
            UserId::new(),
            ReviewTarget::Track(TrackId::new()),
            Ratings::new(0, 5, 5, 5),
            5,
            "",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRating { field: "rhymes", .. }));
    }

    #[test]
    fn test_moderate_pending_review() {
        let mut review = pending_review();
        let admin = UserId::new();
        let now = Utc::now();
        review.moderate(admin, Decision::Approve, now).unwrap();
        assert_eq!(review.status(), ReviewStatus::Approved);
        assert_eq!(review.moderator_id(), Some(admin));
        assert_eq!(review.moderated_at(), Some(now));
    }

    #[test]
    fn test_moderate_twice_is_invalid_transition() {
        let mut review = pending_review();
        review
            .moderate(UserId::new(), Decision::Reject, Utc::now())
            .unwrap();
        let err = review
            .moderate(UserId::new(), Decision::Approve, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ReviewStatus::Rejected,
                to: ReviewStatus::Approved
            }
        ));
    }

    #[test]
    fn test_edit_approved_review_resets_to_pending() {
        let mut review = pending_review();
        review
            .moderate(UserId::new(), Decision::Approve, Utc::now())
            .unwrap();

        let edit = ReviewEdit {
            ratings: Some(Ratings::new(10, 10, 10, 10)),
            ..ReviewEdit::default()
        };
        assert!(review.apply_edit(&edit, Utc::now()).unwrap());

        assert_eq!(review.status(), ReviewStatus::Pending);
        assert!(review.moderator_id().is_none());
        assert!(review.moderated_at().is_none());
        assert_eq!(
            review.final_score(),
            score::compute(&Ratings::new(10, 10, 10, 10), 6)
                .unwrap()
                .final_score
        );
    }

    #[test]
    fn test_edit_atmosphere_recomputes_multiplier() {
        let mut review = pending_review();
        let edit = ReviewEdit {
            atmosphere: Some(10),
            ..ReviewEdit::default()
        };
        review.apply_edit(&edit, Utc::now()).unwrap();
        assert_eq!(review.atmosphere(), 10);
        assert!((review.atmosphere_multiplier() - score::MAX_MULTIPLIER).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_edit_leaves_review_untouched() {
        let mut review = pending_review();
        review
            .moderate(UserId::new(), Decision::Approve, Utc::now())
            .unwrap();
        let before = review.clone();

        let edit = ReviewEdit {
            atmosphere: Some(42),
            text: Some("changed".to_string()),
            ..ReviewEdit::default()
        };
        assert!(review.apply_edit(&edit, Utc::now()).is_err());
        assert_eq!(review, before);
    }

    #[test]
    fn test_empty_edit_is_noop() {
        let mut review = pending_review();
        review
            .moderate(UserId::new(), Decision::Approve, Utc::now())
            .unwrap();
        assert!(!review.apply_edit(&ReviewEdit::default(), Utc::now()).unwrap());
        assert_eq!(review.status(), ReviewStatus::Approved);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("approved".parse::<ReviewStatus>().unwrap(), ReviewStatus::Approved);
        assert!("published".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn test_review_serializes_for_output() {
        let review = pending_review();
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["final_score"], review.final_score());
        assert_eq!(json["target"]["kind"], "album");
        assert!(json["moderator_id"].is_null());
        assert!(json["deleted_at"].is_null());
    }
}
