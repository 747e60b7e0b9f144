//! Operations of backspin.
//!
//! The review lifecycle, the reaction ledger and catalog management, each
//! running its writes in one transaction against a
//! [`backspin_core::schema::Database`]. Callers resolve the acting user
//! through an [`IdentityGate`] and pass the resulting `Actor` explicitly.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod config;
pub mod identity;
pub mod ledger;
pub mod lifecycle;

pub use catalog::{Catalog, NewAlbum, NewTrack};
pub use config::Config;
pub use identity::{HandleGate, IdentityGate};
pub use ledger::{ReactOutcome, ReactionLedger, UnreactOutcome};
pub use lifecycle::{NewReview, ReviewLifecycle};
