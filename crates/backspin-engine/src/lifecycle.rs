//! The review state machine.
//!
//! ```text
//!            create                 moderate(Approve)
//!   (none) ---------> Pending ----------------------> Approved
//!                      ^   |                             |
//!                      |   | moderate(Reject)            |
//!                      |   v                             |
//!                      | Rejected                        |
//!                      |   |                             |
//!                      +---+----------- edit ------------+
//! ```
//!
//! Every transition runs in a single transaction together with the
//! recomputation of the target's `average_rating` whenever a review enters
//! or leaves `Approved`. Deletion is a soft delete from any state.

use chrono::Utc;

use backspin_core::model::{
    Actor, Decision, Ratings, Review, ReviewEdit, ReviewId, ReviewStatus, ReviewTarget, UserId,
};
use backspin_core::schema::{Database, Store};
use backspin_core::{Error, Result};

use crate::catalog::require_admin;

/// A review as submitted by its author.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub target: ReviewTarget,
    pub ratings: Ratings,
    pub atmosphere: u8,
    pub text: String,
}

#[derive(Debug)]
pub struct ReviewLifecycle<'db> {
    db: &'db Database,
}

impl<'db> ReviewLifecycle<'db> {
    pub const fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Create a pending review.
    ///
    /// The score is computed before the transaction opens, so invalid
    /// ratings never reach storage. A missing album or track fails with
    /// [`Error::TargetNotFound`] and nothing is written.
    pub fn create(&self, actor: Actor, new: NewReview) -> Result<Review> {
        let review = Review::new(actor.id, new.target, new.ratings, new.atmosphere, new.text)?;
        let target = review.target();

        self.db.transaction(|store| {
            if !store.exists(target.kind(), &target.id_string())? {
                return Err(Error::TargetNotFound {
                    kind: target.kind(),
                    id: target.id_string(),
                });
            }
            store.insert_review(&review)
        })?;

        log::info!(
            "Review {} created on {} (score {})",
            review.id(),
            target,
            review.final_score()
        );
        Ok(review)
    }

    /// Apply the author's content edit.
    ///
    /// Only the author may edit, admins included. A non-empty edit sends the
    /// review back to `Pending`; an empty one returns it unchanged.
    pub fn edit(&self, actor: Actor, id: ReviewId, edit: ReviewEdit) -> Result<Review> {
        let review = self.db.transaction(|store| {
            let mut review = load_live(store, id)?;
            if review.author_id() != actor.id {
                return Err(Error::Forbidden {
                    action: "edit review",
                });
            }

            let was_approved = review.is_approved();
            if !review.apply_edit(&edit, Utc::now())? {
                return Ok(review);
            }
            store.update_review(&review)?;
            if was_approved {
                store.refresh_average(review.target())?;
            }
            Ok(review)
        })?;

        log::info!("Review {} edited (status {})", review.id(), review.status());
        Ok(review)
    }

    /// Approve or reject a pending review. Admins only.
    pub fn moderate(&self, actor: Actor, id: ReviewId, decision: Decision) -> Result<Review> {
        require_admin(actor, "moderate review")?;

        let review = self.db.transaction(|store| {
            let mut review = load_live(store, id)?;
            review.moderate(actor.id, decision, Utc::now())?;
            store.update_review(&review)?;
            if review.is_approved() {
                store.refresh_average(review.target())?;
            }
            Ok(review)
        })?;

        log::info!(
            "Review {} moderated to {} by {}",
            review.id(),
            review.status(),
            actor.id
        );
        Ok(review)
    }

    /// Soft-delete a review. Allowed for its author and for admins.
    pub fn delete(&self, actor: Actor, id: ReviewId) -> Result<()> {
        self.db.transaction(|store| {
            let mut review = load_live(store, id)?;
            if review.author_id() != actor.id && !actor.is_admin {
                return Err(Error::Forbidden {
                    action: "delete review",
                });
            }

            let was_approved = review.is_approved();
            review.mark_deleted(Utc::now());
            store.update_review(&review)?;
            if was_approved {
                store.refresh_average(review.target())?;
            }
            Ok(())
        })?;

        log::info!("Review {} deleted by {}", id, actor.id);
        Ok(())
    }

    pub fn get(&self, id: ReviewId) -> Result<Review> {
        load_live(&self.db.store(), id)
    }

    /// Live reviews of a target, newest first.
    pub fn list_for_target(
        &self,
        target: ReviewTarget,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<Review>> {
        self.db.store().list_reviews_for_target(target, status)
    }

    pub fn list_by_author(&self, author_id: UserId) -> Result<Vec<Review>> {
        self.db.store().list_reviews_by_author(author_id)
    }

    /// The moderation queue: pending reviews, oldest first. Admins only.
    pub fn pending_queue(&self, actor: Actor) -> Result<Vec<Review>> {
        require_admin(actor, "view moderation queue")?;
        self.db.store().list_pending_reviews()
    }
}

fn load_live(store: &Store<'_>, id: ReviewId) -> Result<Review> {
    store.get_live_review(id)?.ok_or_else(|| Error::NotFound {
        entity: "review",
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, NewAlbum};
    use backspin_core::model::{AlbumId, TargetKind, TrackId};

    struct Fixture {
        db: Database,
        author: Actor,
        other: Actor,
        admin: Actor,
        album: AlbumId,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let catalog = Catalog::new(&db);
        let author = catalog.register_user("nas").unwrap().actor();
        let other = catalog.register_user("jay").unwrap().actor();
        let admin = catalog.register_admin(None, "premier").unwrap().actor();
        let album = catalog
            .add_album(
                admin,
                NewAlbum {
                    title: "Illmatic".to_string(),
                    artist: "Nas".to_string(),
                    ..NewAlbum::default()
                },
            )
            .unwrap()
            .id;
        Fixture {
            db,
            author,
            other,
            admin,
            album,
        }
    }

    fn new_review(album: AlbumId, value: u8) -> NewReview {
        NewReview {
            target: ReviewTarget::Album(album),
            ratings: Ratings::new(value, value, value, value),
            atmosphere: value,
            text: String::new(),
        }
    }

    fn average(f: &Fixture) -> f64 {
        Catalog::new(&f.db).get_album(f.album).unwrap().average_rating
    }

    #[test]
    fn test_create_starts_pending() {
        let f = fixture();
        let review = ReviewLifecycle::new(&f.db)
            .create(f.author, new_review(f.album, 10))
            .unwrap();
        assert_eq!(review.status(), ReviewStatus::Pending);
        assert_eq!(review.final_score(), 90);
        assert!(review.moderator_id().is_none());
        assert_eq!(ReviewLifecycle::new(&f.db).get(review.id()).unwrap(), review);
    }

    #[test]
    fn test_create_invalid_rating_writes_nothing() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let mut new = new_review(f.album, 5);
        new.ratings.structure = 11;
        let err = lifecycle.create(f.author, new).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRating {
                field: "structure",
                value: 11
            }
        ));
        assert!(lifecycle.list_by_author(f.author.id).unwrap().is_empty());
    }

    #[test]
    fn test_create_on_missing_track() {
        let f = fixture();
        let mut new = new_review(f.album, 5);
        new.target = ReviewTarget::Track(TrackId::new());
        let err = ReviewLifecycle::new(&f.db).create(f.author, new).unwrap_err();
        assert!(matches!(
            err,
            Error::TargetNotFound {
                kind: TargetKind::Track,
                ..
            }
        ));
    }

    #[test]
    fn test_approve_updates_average() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 10)).unwrap();
        assert!(average(&f).abs() < f64::EPSILON);

        let approved = lifecycle
            .moderate(f.admin, review.id(), Decision::Approve)
            .unwrap();
        assert_eq!(approved.status(), ReviewStatus::Approved);
        assert_eq!(approved.moderator_id(), Some(f.admin.id));
        assert!(approved.moderated_at().is_some());
        assert!((average(&f) - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reject_leaves_average_alone() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 7)).unwrap();
        let rejected = lifecycle
            .moderate(f.admin, review.id(), Decision::Reject)
            .unwrap();
        assert_eq!(rejected.status(), ReviewStatus::Rejected);
        assert!(average(&f).abs() < f64::EPSILON);
    }

    #[test]
    fn test_moderate_requires_admin() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 7)).unwrap();
        let err = lifecycle
            .moderate(f.author, review.id(), Decision::Approve)
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        // Forbidden is reported even for ids that do not exist.
        let err = lifecycle
            .moderate(f.other, ReviewId::new(), Decision::Approve)
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }

    #[test]
    fn test_moderate_twice_is_invalid_transition() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 7)).unwrap();
        lifecycle
            .moderate(f.admin, review.id(), Decision::Approve)
            .unwrap();
        let err = lifecycle
            .moderate(f.admin, review.id(), Decision::Reject)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ReviewStatus::Approved,
                to: ReviewStatus::Rejected,
            }
        ));
    }

    #[test]
    fn test_edit_approved_review_returns_to_pending() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 10)).unwrap();
        lifecycle
            .moderate(f.admin, review.id(), Decision::Approve)
            .unwrap();

        let edited = lifecycle
            .edit(
                f.author,
                review.id(),
                ReviewEdit {
                    ratings: Some(Ratings::new(1, 1, 1, 1)),
                    ..ReviewEdit::default()
                },
            )
            .unwrap();
        assert_eq!(edited.status(), ReviewStatus::Pending);
        assert!(edited.moderator_id().is_none());
        assert!(edited.moderated_at().is_none());
        assert!(edited.final_score() < review.final_score());
        // The review left Approved, so the album has no approved reviews.
        assert!(average(&f).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_edit_is_noop() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 6)).unwrap();
        let approved = lifecycle
            .moderate(f.admin, review.id(), Decision::Approve)
            .unwrap();
        let unchanged = lifecycle
            .edit(f.author, review.id(), ReviewEdit::default())
            .unwrap();
        assert_eq!(unchanged, approved);
    }

    #[test]
    fn test_only_author_edits() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 6)).unwrap();
        let edit = ReviewEdit {
            text: Some("mine now".to_string()),
            ..ReviewEdit::default()
        };
        for actor in [f.other, f.admin] {
            let err = lifecycle.edit(actor, review.id(), edit.clone()).unwrap_err();
            assert!(matches!(err, Error::Forbidden { .. }));
        }
        assert_eq!(lifecycle.get(review.id()).unwrap().text(), "");
    }

    #[test]
    fn test_invalid_edit_leaves_review_untouched() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 6)).unwrap();
        let err = lifecycle
            .edit(
                f.author,
                review.id(),
                ReviewEdit {
                    atmosphere: Some(0),
                    ..ReviewEdit::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRating {
                field: "atmosphere",
                ..
            }
        ));
        assert_eq!(lifecycle.get(review.id()).unwrap(), review);
    }

    #[test]
    fn test_delete_permissions() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let first = lifecycle.create(f.author, new_review(f.album, 6)).unwrap();
        let second = lifecycle.create(f.author, new_review(f.album, 6)).unwrap();

        let err = lifecycle.delete(f.other, first.id()).unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        lifecycle.delete(f.author, first.id()).unwrap();
        lifecycle.delete(f.admin, second.id()).unwrap();

        let err = lifecycle.get(first.id()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        let err = lifecycle.delete(f.author, first.id()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_pending_queue() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let first = lifecycle.create(f.author, new_review(f.album, 4)).unwrap();
        let second = lifecycle.create(f.other, new_review(f.album, 8)).unwrap();
        lifecycle
            .moderate(f.admin, second.id(), Decision::Reject)
            .unwrap();

        let queue = lifecycle.pending_queue(f.admin).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id(), first.id());

        assert!(matches!(
            lifecycle.pending_queue(f.author),
            Err(Error::Forbidden { .. })
        ));
    }

    #[test]
    fn test_list_for_target_with_status() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 4)).unwrap();
        lifecycle.create(f.other, new_review(f.album, 8)).unwrap();
        lifecycle
            .moderate(f.admin, review.id(), Decision::Approve)
            .unwrap();

        let target = ReviewTarget::Album(f.album);
        assert_eq!(lifecycle.list_for_target(target, None).unwrap().len(), 2);
        let approved = lifecycle
            .list_for_target(target, Some(ReviewStatus::Approved))
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id(), review.id());
    }

    fn assert_review_not_found(f: &Fixture, id: ReviewId) {
        let lifecycle = ReviewLifecycle::new(&f.db);
        let edit = ReviewEdit {
            text: Some("second thoughts".to_string()),
            ..ReviewEdit::default()
        };
        let err = lifecycle.edit(f.author, id, edit).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "review", .. }));
        let err = lifecycle
            .moderate(f.admin, id, Decision::Approve)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "review", .. }));
    }

    #[test]
    fn test_edit_and_moderate_deleted_review() {
        let f = fixture();
        let lifecycle = ReviewLifecycle::new(&f.db);
        let review = lifecycle.create(f.author, new_review(f.album, 7)).unwrap();
        lifecycle.delete(f.author, review.id()).unwrap();

        assert_review_not_found(&f, review.id());
        assert!(lifecycle.pending_queue(f.admin).unwrap().is_empty());
        assert!(average(&f).abs() < f64::EPSILON);
    }

    #[test]
    fn test_edit_and_moderate_unknown_review() {
        let f = fixture();
        assert_review_not_found(&f, ReviewId::new());
    }
}
