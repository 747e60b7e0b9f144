//! Likes on albums, tracks and reviews.
//!
//! One ledger serves all three kinds. Each (actor, kind, target) has at most
//! one live reaction; the storage layer's partial unique index is what
//! guarantees this, so concurrent likes from independent connections settle
//! on a single row.

use chrono::Utc;
use serde::Serialize;

use backspin_core::model::{Actor, ReactionTarget, TargetKind, UserId};
use backspin_core::schema::{Database, UniqueInsert};
use backspin_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactOutcome {
    /// `false` when the actor had already reacted.
    pub created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnreactOutcome {
    /// `false` when there was no live reaction to remove.
    pub removed: bool,
}

#[derive(Debug)]
pub struct ReactionLedger<'db> {
    db: &'db Database,
}

impl<'db> ReactionLedger<'db> {
    pub const fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Record a like. Liking twice is not an error.
    pub fn react(&self, actor: Actor, target: ReactionTarget) -> Result<ReactOutcome> {
        let outcome = self.db.transaction(|store| {
            if !store.exists(target.kind(), &target.id_string())? {
                return Err(Error::TargetNotFound {
                    kind: target.kind(),
                    id: target.id_string(),
                });
            }
            match store.insert_reaction(actor.id, target, Utc::now())? {
                UniqueInsert::Inserted => {
                    store.adjust_likes(target, 1)?;
                    Ok(ReactOutcome { created: true })
                }
                UniqueInsert::AlreadyExists => Ok(ReactOutcome { created: false }),
            }
        })?;

        if outcome.created {
            log::info!("{} liked {}", actor.id, target);
        } else {
            log::debug!("{} already likes {}", actor.id, target);
        }
        Ok(outcome)
    }

    /// Remove a like. Removing a like that does not exist is not an error.
    pub fn unreact(&self, actor: Actor, target: ReactionTarget) -> Result<UnreactOutcome> {
        let removed = self.db.transaction(|store| {
            let removed = store.remove_reaction(actor.id, target, Utc::now())?;
            if removed {
                store.adjust_likes(target, -1)?;
            }
            Ok(removed)
        })?;

        if removed {
            log::info!("{} unliked {}", actor.id, target);
        }
        Ok(UnreactOutcome { removed })
    }

    /// Number of live likes on a target.
    pub fn count(&self, target: ReactionTarget) -> Result<i64> {
        self.db.store().count_reactions(target)
    }

    pub fn has_reacted(&self, actor: Actor, target: ReactionTarget) -> Result<bool> {
        Ok(self.db.store().get_live_reaction(actor.id, target)?.is_some())
    }

    /// Ids of the targets of one kind a user currently likes, newest first.
    pub fn liked_by(&self, user: UserId, kind: TargetKind) -> Result<Vec<String>> {
        let reactions = self.db.store().list_live_reactions(user, kind)?;
        Ok(reactions.into_iter().map(|r| r.target_id).collect())
    }
}
