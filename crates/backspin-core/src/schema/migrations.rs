/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Users
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    handle TEXT NOT NULL UNIQUE,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Genres
CREATE TABLE IF NOT EXISTS genres (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

-- Albums
CREATE TABLE IF NOT EXISTS albums (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    release_year INTEGER,
    genre_id TEXT REFERENCES genres(id),
    average_rating REAL NOT NULL DEFAULT 0,
    likes_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_albums_genre_id ON albums(genre_id);

-- Tracks
CREATE TABLE IF NOT EXISTS tracks (
    id TEXT PRIMARY KEY,
    album_id TEXT REFERENCES albums(id),
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    duration_secs INTEGER,
    average_rating REAL NOT NULL DEFAULT 0,
    likes_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tracks_album_id ON tracks(album_id);

-- Reviews (exactly one of album_id / track_id; deleted_at marks soft removal)
CREATE TABLE IF NOT EXISTS reviews (
    id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL REFERENCES users(id),
    album_id TEXT REFERENCES albums(id),
    track_id TEXT REFERENCES tracks(id),
    rhymes INTEGER NOT NULL CHECK (rhymes BETWEEN 1 AND 10),
    structure INTEGER NOT NULL CHECK (structure BETWEEN 1 AND 10),
    implementation INTEGER NOT NULL CHECK (implementation BETWEEN 1 AND 10),
    individuality INTEGER NOT NULL CHECK (individuality BETWEEN 1 AND 10),
    atmosphere INTEGER NOT NULL CHECK (atmosphere BETWEEN 1 AND 10),
    atmosphere_multiplier REAL NOT NULL,
    final_score INTEGER NOT NULL,
    text TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
    moderator_id TEXT REFERENCES users(id),
    moderated_at TEXT,
    likes_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    CHECK ((album_id IS NULL) <> (track_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_reviews_album_id ON reviews(album_id);
CREATE INDEX IF NOT EXISTS idx_reviews_track_id ON reviews(track_id);
CREATE INDEX IF NOT EXISTS idx_reviews_author_id ON reviews(author_id);
CREATE INDEX IF NOT EXISTS idx_reviews_status ON reviews(status);

-- Reactions (likes on albums, tracks and reviews)
CREATE TABLE IF NOT EXISTS reactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id TEXT NOT NULL REFERENCES users(id),
    target_kind TEXT NOT NULL CHECK (target_kind IN ('album', 'track', 'review')),
    target_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    deleted_at TEXT
);

-- One live reaction per (actor, target); removed rows fall outside the index.
CREATE UNIQUE INDEX IF NOT EXISTS idx_reactions_live
    ON reactions(actor_id, target_kind, target_id)
    WHERE deleted_at IS NULL;

CREATE INDEX IF NOT EXISTS idx_reactions_target
    ON reactions(target_kind, target_id)
    WHERE deleted_at IS NULL;
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
