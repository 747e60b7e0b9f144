use anyhow::Result;
use backspin_engine::ReactionLedger;
use serde_json::json;

use super::{reaction_target, KindArg, Session};

pub fn like(session: &Session, kind: KindArg, id: &str) -> Result<()> {
    let target = reaction_target(kind, id)?;
    let actor = session.actor()?;
    let outcome = ReactionLedger::new(&session.db).react(actor, target)?;
    session.emit(&outcome, |outcome| {
        if outcome.created {
            println!("✓ Liked {}", target);
        } else {
            println!("Already liked {}", target);
        }
    })
}

pub fn unlike(session: &Session, kind: KindArg, id: &str) -> Result<()> {
    let target = reaction_target(kind, id)?;
    let actor = session.actor()?;
    let outcome = ReactionLedger::new(&session.db).unreact(actor, target)?;
    session.emit(&outcome, |outcome| {
        if outcome.removed {
            println!("✓ Unliked {}", target);
        } else {
            println!("Not liked: {}", target);
        }
    })
}

/// Count the likes on a target, and whether the caller is among them when
/// `--as` was given.
pub fn likes(session: &Session, kind: KindArg, id: &str) -> Result<()> {
    let target = reaction_target(kind, id)?;
    let ledger = ReactionLedger::new(&session.db);
    let count = ledger.count(target)?;
    let mine = match session.optional_actor()? {
        Some(actor) => Some(ledger.has_reacted(actor, target)?),
        None => None,
    };
    session.emit(&json!({ "target": target, "count": count, "liked": mine }), |_| {
        println!("{}: {} like(s)", target, count);
        if mine == Some(true) {
            println!("  including yours");
        }
    })
}

/// The caller's liked targets of one kind.
pub fn liked(session: &Session, kind: KindArg) -> Result<()> {
    let actor = session.actor()?;
    let ids = ReactionLedger::new(&session.db).liked_by(actor.id, kind.into())?;
    session.emit(&ids, |ids| {
        for id in ids {
            println!("{}", id);
        }
    })
}
