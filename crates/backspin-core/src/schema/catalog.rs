use rusqlite::{params, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::model::{Album, AlbumId, Genre, GenreId, Track, TrackId, User};

use super::store::Store;
use super::{is_unique_violation, timestamp};

const USER_COLUMNS: &str = "id, handle, is_admin, created_at";
const GENRE_COLUMNS: &str = "id, name, created_at";
const ALBUM_COLUMNS: &str = "id, title, artist, release_year, genre_id, average_rating, \
                             likes_count, created_at, updated_at";
const TRACK_COLUMNS: &str = "id, album_id, title, artist, duration_secs, average_rating, \
                             likes_count, created_at, updated_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        handle: row.get(1)?,
        is_admin: row.get(2)?,
        created_at: timestamp(row, 3)?,
    })
}

fn row_to_genre(row: &Row<'_>) -> rusqlite::Result<Genre> {
    Ok(Genre {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: timestamp(row, 2)?,
    })
}

fn row_to_album(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        release_year: row.get(3)?,
        genre_id: row.get(4)?,
        average_rating: row.get(5)?,
        likes_count: row.get(6)?,
        created_at: timestamp(row, 7)?,
        updated_at: timestamp(row, 8)?,
    })
}

fn row_to_track(row: &Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        album_id: row.get(1)?,
        title: row.get(2)?,
        artist: row.get(3)?,
        duration_secs: row.get(4)?,
        average_rating: row.get(5)?,
        likes_count: row.get(6)?,
        created_at: timestamp(row, 7)?,
        updated_at: timestamp(row, 8)?,
    })
}

// User CRUD
impl Store<'_> {
    /// Insert a new user. Fails with [`Error::AlreadyExists`] if the handle
    /// is taken.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO users (id, handle, is_admin, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.handle, user.is_admin, user.created_at.to_rfc3339()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyExists {
                        entity: "user",
                        key: user.handle.clone(),
                    }
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    /// Number of users holding the admin role.
    pub fn count_admins(&self) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_user_by_handle(&self, handle: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE handle = ?1"),
                [handle],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY handle"))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }
}

// Genre CRUD
impl Store<'_> {
    /// Insert a new genre. Genre names are unique.
    pub fn insert_genre(&self, genre: &Genre) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO genres (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![genre.id, genre.name, genre.created_at.to_rfc3339()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyExists {
                        entity: "genre",
                        key: genre.name.clone(),
                    }
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    pub fn get_genre(&self, id: GenreId) -> Result<Option<Genre>> {
        let genre = self
            .conn
            .query_row(
                &format!("SELECT {GENRE_COLUMNS} FROM genres WHERE id = ?1"),
                [id],
                row_to_genre,
            )
            .optional()?;
        Ok(genre)
    }

    pub fn list_genres(&self) -> Result<Vec<Genre>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GENRE_COLUMNS} FROM genres ORDER BY name"))?;
        let genres = stmt
            .query_map([], row_to_genre)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(genres)
    }
}

// Album CRUD
impl Store<'_> {
    pub fn insert_album(&self, album: &Album) -> Result<()> {
        self.conn.execute(
            "INSERT INTO albums (
                id, title, artist, release_year, genre_id, average_rating,
                likes_count, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                album.id,
                album.title,
                album.artist,
                album.release_year,
                album.genre_id,
                album.average_rating,
                album.likes_count,
                album.created_at.to_rfc3339(),
                album.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_album(&self, id: AlbumId) -> Result<Option<Album>> {
        let album = self
            .conn
            .query_row(
                &format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE id = ?1"),
                [id],
                row_to_album,
            )
            .optional()?;
        Ok(album)
    }

    /// List albums, optionally restricted to one genre, best rated first.
    pub fn list_albums(&self, genre_id: Option<GenreId>) -> Result<Vec<Album>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ALBUM_COLUMNS} FROM albums
             WHERE ?1 IS NULL OR genre_id = ?1
             ORDER BY average_rating DESC, title"
        ))?;
        let albums = stmt
            .query_map([genre_id], row_to_album)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(albums)
    }
}

// Track CRUD
impl Store<'_> {
    pub fn insert_track(&self, track: &Track) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tracks (
                id, album_id, title, artist, duration_secs, average_rating,
                likes_count, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                track.id,
                track.album_id,
                track.title,
                track.artist,
                track.duration_secs,
                track.average_rating,
                track.likes_count,
                track.created_at.to_rfc3339(),
                track.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_track(&self, id: TrackId) -> Result<Option<Track>> {
        let track = self
            .conn
            .query_row(
                &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?1"),
                [id],
                row_to_track,
            )
            .optional()?;
        Ok(track)
    }

    pub fn list_tracks_for_album(&self, album_id: AlbumId) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE album_id = ?1 ORDER BY created_at, title"
        ))?;
        let tracks = stmt
            .query_map([album_id], row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }
}
