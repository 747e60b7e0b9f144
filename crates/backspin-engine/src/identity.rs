//! Resolving the caller of an operation to an [`Actor`].

use backspin_core::model::Actor;
use backspin_core::schema::Database;
use backspin_core::{Error, Result};

/// Turns a credential presented at the boundary into an [`Actor`].
///
/// Engine operations never look up the caller themselves; the boundary
/// resolves it once and passes the `Actor` in.
pub trait IdentityGate {
    /// Fails with [`Error::Unauthenticated`] when no credential was
    /// presented or it does not name a known user.
    fn resolve(&self, credential: Option<&str>) -> Result<Actor>;
}

/// Resolves a user handle against the `users` table.
#[derive(Debug)]
pub struct HandleGate<'db> {
    db: &'db Database,
}

impl<'db> HandleGate<'db> {
    pub const fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl IdentityGate for HandleGate<'_> {
    fn resolve(&self, credential: Option<&str>) -> Result<Actor> {
        let handle = credential
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(Error::Unauthenticated)?;
        match self.db.store().get_user_by_handle(handle)? {
            Some(user) => Ok(user.actor()),
            None => {
                log::debug!("Unknown handle '{}'", handle);
                Err(Error::Unauthenticated)
            }
        }
    }
}
