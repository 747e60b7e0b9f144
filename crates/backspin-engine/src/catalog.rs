//! Users, genres, albums and tracks.
//!
//! Anyone may register; only admins add catalog entries. Reviews and likes
//! point at the entities managed here.

use backspin_core::model::{
    Actor, Album, AlbumId, Genre, GenreId, TargetKind, Track, TrackId, User,
};
use backspin_core::schema::Database;
use backspin_core::{Error, Result};

/// Fields for a new album.
#[derive(Debug, Clone, Default)]
pub struct NewAlbum {
    pub title: String,
    pub artist: String,
    pub release_year: Option<i32>,
    pub genre_id: Option<GenreId>,
}

/// Fields for a new track.
#[derive(Debug, Clone, Default)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub album_id: Option<AlbumId>,
    pub duration_secs: Option<i64>,
}

#[derive(Debug)]
pub struct Catalog<'db> {
    db: &'db Database,
}

impl<'db> Catalog<'db> {
    pub const fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Register a regular user. Handles are unique.
    pub fn register_user(&self, handle: &str) -> Result<User> {
        let user = User::new(required("handle", handle)?);
        self.db.transaction(|store| store.insert_user(&user))?;
        log::info!("Registered user '{}'", user.handle);
        Ok(user)
    }

    /// Register an admin.
    ///
    /// An existing admin must grant the role. The only exception is the
    /// first admin of an empty site, which may be registered by anyone.
    pub fn register_admin(&self, granted_by: Option<Actor>, handle: &str) -> Result<User> {
        let user = User::new(required("handle", handle)?).with_admin(true);
        let granted = granted_by.is_some_and(|actor| actor.is_admin);

        self.db.transaction(|store| {
            if !granted && store.count_admins()? > 0 {
                return Err(Error::Forbidden {
                    action: "grant admin",
                });
            }
            store.insert_user(&user)
        })?;

        match granted_by {
            Some(actor) if granted => {
                log::info!("Registered admin '{}' (granted by {})", user.handle, actor.id);
            }
            _ => log::info!("Registered first admin '{}'", user.handle),
        }
        Ok(user)
    }

    pub fn add_genre(&self, actor: Actor, name: &str) -> Result<Genre> {
        require_admin(actor, "add genre")?;
        let genre = Genre::new(required("genre name", name)?);
        self.db.transaction(|store| store.insert_genre(&genre))?;
        log::info!("Added genre '{}'", genre.name);
        Ok(genre)
    }

    pub fn add_album(&self, actor: Actor, new: NewAlbum) -> Result<Album> {
        require_admin(actor, "add album")?;
        let mut album = Album::new(
            required("album title", &new.title)?,
            required("album artist", &new.artist)?,
        );
        album.release_year = new.release_year;
        album.genre_id = new.genre_id;

        self.db.transaction(|store| {
            if let Some(genre_id) = album.genre_id {
                if store.get_genre(genre_id)?.is_none() {
                    return Err(Error::NotFound {
                        entity: "genre",
                        id: genre_id.to_string(),
                    });
                }
            }
            store.insert_album(&album)
        })?;
        log::info!("Added album '{}' by {} ({})", album.title, album.artist, album.id);
        Ok(album)
    }

    /// Add a track, optionally on an existing album.
    pub fn add_track(&self, actor: Actor, new: NewTrack) -> Result<Track> {
        require_admin(actor, "add track")?;
        let mut track = Track::new(
            required("track title", &new.title)?,
            required("track artist", &new.artist)?,
        );
        track.album_id = new.album_id;
        track.duration_secs = new.duration_secs;

        self.db.transaction(|store| {
            if let Some(album_id) = track.album_id {
                if !store.exists(TargetKind::Album, &album_id.to_string())? {
                    return Err(Error::TargetNotFound {
                        kind: TargetKind::Album,
                        id: album_id.to_string(),
                    });
                }
            }
            store.insert_track(&track)
        })?;
        log::info!("Added track '{}' by {} ({})", track.title, track.artist, track.id);
        Ok(track)
    }

    pub fn get_album(&self, id: AlbumId) -> Result<Album> {
        self.db.store().get_album(id)?.ok_or_else(|| Error::NotFound {
            entity: "album",
            id: id.to_string(),
        })
    }

    pub fn get_track(&self, id: TrackId) -> Result<Track> {
        self.db.store().get_track(id)?.ok_or_else(|| Error::NotFound {
            entity: "track",
            id: id.to_string(),
        })
    }

    /// Albums, best rated first, optionally restricted to one genre.
    pub fn list_albums(&self, genre_id: Option<GenreId>) -> Result<Vec<Album>> {
        self.db.store().list_albums(genre_id)
    }

    pub fn list_tracks(&self, album_id: AlbumId) -> Result<Vec<Track>> {
        self.db.store().list_tracks_for_album(album_id)
    }

    pub fn list_genres(&self) -> Result<Vec<Genre>> {
        self.db.store().list_genres()
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.db.store().list_users()
    }
}

pub(crate) const fn require_admin(actor: Actor, action: &'static str) -> Result<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(Error::Forbidden { action })
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::InvalidData(format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}
