use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

/// A registered user of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Unique login handle.
    pub handle: String,

    /// Admins may moderate reviews and manage the catalog.
    pub is_admin: bool,

    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            handle: handle.into(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    /// The identity this user acts under.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// The resolved identity performing an operation.
///
/// Every mutating operation takes an `Actor` explicitly; nothing reads the
/// caller's identity from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub is_admin: bool,
}

impl Actor {
    #[must_use]
    pub const fn admin(id: UserId) -> Self {
        Self { id, is_admin: true }
    }
}
