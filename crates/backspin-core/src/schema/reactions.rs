use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::Result;
use crate::model::{Reaction, ReactionTarget, TargetKind, UserId};

use super::store::{Store, UniqueInsert};
use super::{is_unique_violation, optional_timestamp, timestamp};

const REACTION_COLUMNS: &str = "id, actor_id, target_kind, target_id, created_at, deleted_at";

fn row_to_reaction(row: &Row<'_>) -> rusqlite::Result<Reaction> {
    Ok(Reaction {
        id: row.get(0)?,
        actor_id: row.get(1)?,
        target_kind: row.get(2)?,
        target_id: row.get(3)?,
        created_at: timestamp(row, 4)?,
        deleted_at: optional_timestamp(row, 5)?,
    })
}

// Reaction CRUD
impl Store<'_> {
    /// Insert a live reaction in a single statement.
    ///
    /// The partial unique index `idx_reactions_live` rejects a second live
    /// row for the same (actor, kind, target); that rejection is reported
    /// as [`UniqueInsert::AlreadyExists`]. There is no prior lookup.
    pub fn insert_reaction(
        &self,
        actor_id: UserId,
        target: ReactionTarget,
        now: DateTime<Utc>,
    ) -> Result<UniqueInsert> {
        let inserted = self.conn.execute(
            "INSERT INTO reactions (actor_id, target_kind, target_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![actor_id, target.kind(), target.id_string(), now.to_rfc3339()],
        );
        match inserted {
            Ok(_) => Ok(UniqueInsert::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(UniqueInsert::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Soft-remove the live reaction, if any. Returns whether a row changed.
    pub fn remove_reaction(
        &self,
        actor_id: UserId,
        target: ReactionTarget,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE reactions SET deleted_at = ?4
             WHERE actor_id = ?1 AND target_kind = ?2 AND target_id = ?3
               AND deleted_at IS NULL",
            params![actor_id, target.kind(), target.id_string(), now.to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    /// Number of live reactions on a target.
    pub fn count_reactions(&self, target: ReactionTarget) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM reactions
             WHERE target_kind = ?1 AND target_id = ?2 AND deleted_at IS NULL",
            params![target.kind(), target.id_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_live_reaction(
        &self,
        actor_id: UserId,
        target: ReactionTarget,
    ) -> Result<Option<Reaction>> {
        let reaction = self
            .conn
            .query_row(
                &format!(
                    "SELECT {REACTION_COLUMNS} FROM reactions
                     WHERE actor_id = ?1 AND target_kind = ?2 AND target_id = ?3
                       AND deleted_at IS NULL"
                ),
                params![actor_id, target.kind(), target.id_string()],
                row_to_reaction,
            )
            .optional()?;
        Ok(reaction)
    }

    /// An actor's live reactions of one kind, newest first.
    pub fn list_live_reactions(&self, actor_id: UserId, kind: TargetKind) -> Result<Vec<Reaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REACTION_COLUMNS} FROM reactions
             WHERE actor_id = ?1 AND target_kind = ?2 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        ))?;
        let reactions = stmt
            .query_map(params![actor_id, kind], row_to_reaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reactions)
    }

    /// Add `delta` to the target's denormalised `likes_count`.
    pub fn adjust_likes(&self, target: ReactionTarget, delta: i64) -> Result<()> {
        let table = target.kind().table();
        self.conn.execute(
            &format!("UPDATE {table} SET likes_count = MAX(likes_count + ?2, 0) WHERE id = ?1"),
            params![target.id_string(), delta],
        )?;
        Ok(())
    }
}
