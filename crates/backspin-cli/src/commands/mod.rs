pub mod catalog;
pub mod config;
pub mod like;
pub mod review;
pub mod score;
pub mod status;
pub mod user;

use anyhow::{Context, Result};
use backspin_core::model::{Actor, ReactionTarget, TargetKind};
use backspin_core::schema::Database;
use backspin_core::Error;
use backspin_engine::{Config, HandleGate, IdentityGate};
use clap::ValueEnum;
use serde::Serialize;

/// Everything a command needs: the open database, the caller's handle and
/// the output mode.
#[derive(Debug)]
pub struct Session {
    pub db: Database,
    handle: Option<String>,
    json: bool,
}

impl Session {
    pub fn open(config: &Config, handle: Option<String>, json: bool) -> Result<Self> {
        let db = config.open_database()?;
        Ok(Self { db, handle, json })
    }

    /// Resolve the `--as` handle to an actor.
    pub fn actor(&self) -> Result<Actor> {
        HandleGate::new(&self.db)
            .resolve(self.handle.as_deref())
            .context("Pass --as <HANDLE> naming a registered user")
    }

    /// Like [`Session::actor`], but `None` when `--as` was not given. A
    /// handle that was given must still resolve.
    pub fn optional_actor(&self) -> Result<Option<Actor>> {
        match HandleGate::new(&self.db).resolve(self.handle.as_deref()) {
            Ok(actor) => Ok(Some(actor)),
            Err(Error::Unauthenticated) if self.handle.is_none() => Ok(None),
            Err(e) => Err(e).context("Pass --as <HANDLE> naming a registered user"),
        }
    }

    /// Print `value` as JSON, or run `text` to print it for humans.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }
}

/// Target kind as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Album,
    Track,
    Review,
}

impl From<KindArg> for TargetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Album => Self::Album,
            KindArg::Track => Self::Track,
            KindArg::Review => Self::Review,
        }
    }
}

pub fn reaction_target(kind: KindArg, id: &str) -> Result<ReactionTarget> {
    Ok(ReactionTarget::parse(kind.into(), id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use backspin_engine::Catalog;

    fn session(handle: Option<&str>) -> Session {
        let db = Database::open_in_memory().unwrap();
        Catalog::new(&db).register_user("rza").unwrap();
        Session {
            db,
            handle: handle.map(str::to_string),
            json: false,
        }
    }

    #[test]
    fn test_optional_actor_without_handle() {
        assert!(session(None).optional_actor().unwrap().is_none());
    }

    #[test]
    fn test_optional_actor_with_known_handle() {
        let actor = session(Some("rza")).optional_actor().unwrap().unwrap();
        assert!(!actor.is_admin);
    }

    #[test]
    fn test_optional_actor_rejects_unknown_handle() {
        let err = session(Some("gza")).optional_actor().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Unauthenticated)
        ));
    }
}
