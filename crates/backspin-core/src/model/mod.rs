pub mod album;
pub mod genre;
pub mod ids;
pub mod reaction;
pub mod review;
pub mod track;
pub mod user;

pub use album::Album;
pub use genre::Genre;
pub use ids::{AlbumId, GenreId, ReviewId, TrackId, UserId};
pub use reaction::{Reaction, ReactionTarget, TargetKind};
pub use review::{Decision, Ratings, Review, ReviewEdit, ReviewStatus, ReviewTarget};
pub use track::Track;
pub use user::{Actor, User};
