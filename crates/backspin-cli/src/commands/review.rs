use anyhow::{bail, Result};
use backspin_core::model::{
    AlbumId, Decision, Ratings, Review, ReviewEdit, ReviewId, ReviewStatus, ReviewTarget, TrackId,
};
use backspin_engine::{NewReview, ReviewLifecycle};

use super::Session;

/// The four rating flags as parsed; all or none must be given.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingArgs {
    pub rhymes: Option<u8>,
    pub structure: Option<u8>,
    pub implementation: Option<u8>,
    pub individuality: Option<u8>,
}

impl RatingArgs {
    pub fn into_ratings(self) -> Result<Option<Ratings>> {
        match (self.rhymes, self.structure, self.implementation, self.individuality) {
            (None, None, None, None) => Ok(None),
            (Some(r), Some(s), Some(i), Some(ind)) => Ok(Some(Ratings::new(r, s, i, ind))),
            _ => bail!(
                "Give all of --rhymes, --structure, --implementation and --individuality, or none"
            ),
        }
    }
}

fn print_review(review: &Review) {
    let ratings = review.ratings();
    println!("Review {}", review.id());
    println!("  Target: {}", review.target());
    println!("  Status: {}", review.status());
    println!(
        "  Ratings: rhymes {} / structure {} / implementation {} / individuality {}",
        ratings.rhymes, ratings.structure, ratings.implementation, ratings.individuality
    );
    println!(
        "  Atmosphere: {} (x{:.4})",
        review.atmosphere(),
        review.atmosphere_multiplier()
    );
    println!("  Score: {}", review.final_score());
    println!("  Likes: {}", review.likes_count());
    if let Some(moderator) = review.moderator_id() {
        println!("  Moderated by: {}", moderator);
    }
    if !review.text().is_empty() {
        println!("\n  {}", review.text());
    }
}

fn print_summary(reviews: &[Review]) {
    if reviews.is_empty() {
        println!("No reviews");
    }
    for review in reviews {
        println!(
            "{:>3}  {:<8}  {}  on {}",
            review.final_score(),
            review.status(),
            review.id(),
            review.target()
        );
    }
}

pub fn create(
    session: &Session,
    album: Option<AlbumId>,
    track: Option<TrackId>,
    ratings: RatingArgs,
    atmosphere: u8,
    text: Option<String>,
) -> Result<()> {
    let actor = session.actor()?;
    let target = ReviewTarget::from_parts(album, track)?;
    let Some(ratings) = ratings.into_ratings()? else {
        bail!("A review needs all four ratings");
    };
    let review = ReviewLifecycle::new(&session.db).create(
        actor,
        NewReview {
            target,
            ratings,
            atmosphere,
            text: text.unwrap_or_default(),
        },
    )?;
    session.emit(&review, |review| {
        println!(
            "✓ Created review {} (score {}, pending moderation)",
            review.id(),
            review.final_score()
        );
    })
}

pub fn edit(
    session: &Session,
    id: ReviewId,
    ratings: RatingArgs,
    atmosphere: Option<u8>,
    text: Option<String>,
) -> Result<()> {
    let actor = session.actor()?;
    let edit = ReviewEdit {
        ratings: ratings.into_ratings()?,
        atmosphere,
        text,
    };
    let review = ReviewLifecycle::new(&session.db).edit(actor, id, edit)?;
    session.emit(&review, |review| {
        println!(
            "✓ Updated review {} (score {}, {})",
            review.id(),
            review.final_score(),
            review.status()
        );
    })
}

pub fn moderate(session: &Session, id: ReviewId, decision: Decision) -> Result<()> {
    let actor = session.actor()?;
    let review = ReviewLifecycle::new(&session.db).moderate(actor, id, decision)?;
    session.emit(&review, |review| {
        println!("✓ Review {} is now {}", review.id(), review.status());
    })
}

pub fn delete(session: &Session, id: ReviewId) -> Result<()> {
    let actor = session.actor()?;
    ReviewLifecycle::new(&session.db).delete(actor, id)?;
    session.emit(&serde_json::json!({ "deleted": id }), |_| {
        println!("✓ Deleted review {}", id);
    })
}

pub fn show(session: &Session, id: ReviewId) -> Result<()> {
    let review = ReviewLifecycle::new(&session.db).get(id)?;
    session.emit(&review, print_review)
}

/// List the reviews of an album or track, or those written by a user.
pub fn list(
    session: &Session,
    album: Option<AlbumId>,
    track: Option<TrackId>,
    author: Option<String>,
    status: Option<ReviewStatus>,
) -> Result<()> {
    let lifecycle = ReviewLifecycle::new(&session.db);
    let reviews = if let Some(handle) = author {
        let Some(user) = session.db.store().get_user_by_handle(&handle)? else {
            bail!("Unknown user: {}", handle);
        };
        let mut reviews = lifecycle.list_by_author(user.id)?;
        if let Some(status) = status {
            reviews.retain(|r| r.status() == status);
        }
        reviews
    } else {
        let target = ReviewTarget::from_parts(album, track)?;
        lifecycle.list_for_target(target, status)?
    };
    session.emit(&reviews, |reviews| print_summary(reviews))
}

/// The moderation queue.
pub fn pending(session: &Session) -> Result<()> {
    let actor = session.actor()?;
    let reviews = ReviewLifecycle::new(&session.db).pending_queue(actor)?;
    session.emit(&reviews, |reviews| print_summary(reviews))
}
