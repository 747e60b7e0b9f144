use rusqlite::{params, OptionalExtension};

use crate::error::Result;
use crate::model::{Review, ReviewId, ReviewStatus, ReviewTarget, UserId};

use super::store::Store;

pub(crate) const REVIEW_COLUMNS: &str = "id, author_id, album_id, track_id, rhymes, structure, \
     implementation, individuality, atmosphere, atmosphere_multiplier, final_score, text, \
     status, moderator_id, moderated_at, likes_count, created_at, updated_at, deleted_at";

// Review CRUD
impl Store<'_> {
    pub fn insert_review(&self, review: &Review) -> Result<()> {
        let target = review.target();
        let ratings = review.ratings();
        self.conn.execute(
            &format!(
                "INSERT INTO reviews ({REVIEW_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                         ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
            ),
            params![
                review.id(),
                review.author_id(),
                target.album_id(),
                target.track_id(),
                ratings.rhymes,
                ratings.structure,
                ratings.implementation,
                ratings.individuality,
                review.atmosphere(),
                review.atmosphere_multiplier(),
                review.final_score(),
                review.text(),
                review.status(),
                review.moderator_id(),
                review.moderated_at().map(|t| t.to_rfc3339()),
                review.likes_count(),
                review.created_at().to_rfc3339(),
                review.updated_at().to_rfc3339(),
                review.deleted_at().map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Persist the mutable state of a review.
    ///
    /// The author, the target and `likes_count` are never rewritten here;
    /// likes are maintained by the reaction ledger.
    pub fn update_review(&self, review: &Review) -> Result<()> {
        let ratings = review.ratings();
        self.conn.execute(
            "UPDATE reviews SET
                rhymes = ?2, structure = ?3, implementation = ?4, individuality = ?5,
                atmosphere = ?6, atmosphere_multiplier = ?7, final_score = ?8,
                text = ?9, status = ?10, moderator_id = ?11, moderated_at = ?12,
                updated_at = ?13, deleted_at = ?14
             WHERE id = ?1",
            params![
                review.id(),
                ratings.rhymes,
                ratings.structure,
                ratings.implementation,
                ratings.individuality,
                review.atmosphere(),
                review.atmosphere_multiplier(),
                review.final_score(),
                review.text(),
                review.status(),
                review.moderator_id(),
                review.moderated_at().map(|t| t.to_rfc3339()),
                review.updated_at().to_rfc3339(),
                review.deleted_at().map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Get a review that has not been soft-deleted.
    pub fn get_live_review(&self, id: ReviewId) -> Result<Option<Review>> {
        let review = self
            .conn
            .query_row(
                &format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1 AND deleted_at IS NULL"
                ),
                [id],
                Review::from_row,
            )
            .optional()?;
        Ok(review)
    }

    /// Get a review regardless of soft deletion (audit access).
    pub fn get_review_including_deleted(&self, id: ReviewId) -> Result<Option<Review>> {
        let review = self
            .conn
            .query_row(
                &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"),
                [id],
                Review::from_row,
            )
            .optional()?;
        Ok(review)
    }

    /// Live reviews of a target, newest first, optionally filtered by status.
    pub fn list_reviews_for_target(
        &self,
        target: ReviewTarget,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<Review>> {
        let column = target_column(target);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE {column} = ?1 AND deleted_at IS NULL AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC"
        ))?;
        let reviews = stmt
            .query_map(params![target.id_string(), status], Review::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }

    /// Live reviews written by one user, newest first.
    pub fn list_reviews_by_author(&self, author_id: UserId) -> Result<Vec<Review>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE author_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        ))?;
        let reviews = stmt
            .query_map([author_id], Review::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }

    /// Live pending reviews, oldest first.
    pub fn list_pending_reviews(&self) -> Result<Vec<Review>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE status = 'pending' AND deleted_at IS NULL
             ORDER BY updated_at ASC"
        ))?;
        let reviews = stmt
            .query_map([], Review::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }

    /// Number of live reviews in the given status.
    pub fn count_reviews(&self, status: ReviewStatus) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE status = ?1 AND deleted_at IS NULL",
            [status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Recompute a target's `average_rating` from its approved, live
    /// reviews and store it. An empty set averages to `0.0`.
    pub fn refresh_average(&self, target: ReviewTarget) -> Result<f64> {
        let column = target_column(target);
        let id = target.id_string();
        let average: Option<f64> = self.conn.query_row(
            &format!(
                "SELECT AVG(final_score) FROM reviews
                 WHERE {column} = ?1 AND status = 'approved' AND deleted_at IS NULL"
            ),
            [&id],
            |row| row.get(0),
        )?;
        let average = average.unwrap_or(0.0);

        let table = target.kind().table();
        self.conn.execute(
            &format!(
                "UPDATE {table} SET average_rating = ?2, updated_at = ?3 WHERE id = ?1"
            ),
            params![id, average, chrono::Utc::now().to_rfc3339()],
        )?;
        log::debug!("Average rating of {} is now {:.2}", target, average);
        Ok(average)
    }
}

const fn target_column(target: ReviewTarget) -> &'static str {
    match target {
        ReviewTarget::Album(_) => "album_id",
        ReviewTarget::Track(_) => "track_id",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Album, Decision, Ratings, ReviewEdit, User};
    use crate::schema::Database;
    use chrono::Utc;

    fn seeded() -> (Database, User, Album) {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("prodigy");
        let album = Album::new("The Infamous", "Mobb Deep");
        db.transaction(|store| {
            store.insert_user(&user)?;
            store.insert_album(&album)
        })
        .unwrap();
        (db, user, album)
    }

    fn review(user: &User, album: &Album, value: u8) -> Review {
        Review::new(
            user.id,
            ReviewTarget::Album(album.id),
            Ratings::new(value, value, value, value),
            5,
            "",
        )
        .unwrap()
    }

    #[test]
    fn test_review_round_trip() {
        let (db, user, album) = seeded();
        let mut review = review(&user, &album, 8);
        db.transaction(|store| store.insert_review(&review)).unwrap();

        let loaded = db.store().get_live_review(review.id()).unwrap().unwrap();
        assert_eq!(loaded, review);

        review
            .apply_edit(
                &ReviewEdit {
                    text: Some("grimy".to_string()),
                    ..ReviewEdit::default()
                },
                Utc::now(),
            )
            .unwrap();
        db.transaction(|store| store.update_review(&review)).unwrap();
        let loaded = db.store().get_live_review(review.id()).unwrap().unwrap();
        assert_eq!(loaded.text(), "grimy");
    }

    #[test]
    fn test_soft_deleted_review_hidden_from_reads() {
        let (db, user, album) = seeded();
        let mut review = review(&user, &album, 8);
        db.transaction(|store| store.insert_review(&review)).unwrap();
        review.mark_deleted(Utc::now());
        db.transaction(|store| store.update_review(&review)).unwrap();

        let store = db.store();
        assert!(store.get_live_review(review.id()).unwrap().is_none());
        assert!(store
            .get_review_including_deleted(review.id())
            .unwrap()
            .unwrap()
            .is_deleted());
        assert!(store
            .list_reviews_for_target(ReviewTarget::Album(album.id), None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_refresh_average_counts_only_approved() {
        let (db, user, album) = seeded();
        let admin = User::new("havoc").with_admin(true);
        let mut approved_high = review(&user, &album, 10);
        let mut approved_low = review(&user, &album, 4);
        let pending = review(&user, &album, 1);
        approved_high
            .moderate(admin.id, Decision::Approve, Utc::now())
            .unwrap();
        approved_low
            .moderate(admin.id, Decision::Approve, Utc::now())
            .unwrap();

        let average = db
            .transaction(|store| {
                store.insert_user(&admin)?;
                store.insert_review(&approved_high)?;
                store.insert_review(&approved_low)?;
                store.insert_review(&pending)?;
                store.refresh_average(ReviewTarget::Album(album.id))
            })
            .unwrap();

        let expected =
            (approved_high.final_score() + approved_low.final_score()) as f64 / 2.0;
        assert!((average - expected).abs() < 1e-9);
        let stored = db.store().get_album(album.id).unwrap().unwrap();
        assert!((stored.average_rating - expected).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_average_of_empty_set_is_zero() {
        let (db, _user, album) = seeded();
        let average = db
            .transaction(|store| store.refresh_average(ReviewTarget::Album(album.id)))
            .unwrap();
        assert!(average.abs() < f64::EPSILON);
    }

    #[test]
    fn test_schema_rejects_review_without_target() {
        let (db, user, _album) = seeded();
        let result = db.conn().execute(
            "INSERT INTO reviews (id, author_id, rhymes, structure, implementation,
                individuality, atmosphere, atmosphere_multiplier, final_score, status,
                created_at, updated_at)
             VALUES ('x', ?1, 5, 5, 5, 5, 5, 1.0, 28, 'pending', 'now', 'now')",
            [user.id],
        );
        assert!(result.is_err());
    }
}
