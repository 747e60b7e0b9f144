use anyhow::Result;
use backspin_core::model::{AlbumId, GenreId, ReactionTarget, ReviewStatus, ReviewTarget, TrackId};
use backspin_engine::{Catalog, NewAlbum, NewTrack, ReactionLedger, ReviewLifecycle};
use serde_json::json;

use super::Session;

pub fn add_genre(session: &Session, name: &str) -> Result<()> {
    let actor = session.actor()?;
    let genre = Catalog::new(&session.db).add_genre(actor, name)?;
    session.emit(&genre, |genre| {
        println!("✓ Added genre {} ({})", genre.name, genre.id);
    })
}

pub fn list_genres(session: &Session) -> Result<()> {
    let genres = Catalog::new(&session.db).list_genres()?;
    session.emit(&genres, |genres| {
        for genre in genres {
            println!("{:<30} {}", genre.name, genre.id);
        }
    })
}

pub fn add_album(session: &Session, new: NewAlbum) -> Result<()> {
    let actor = session.actor()?;
    let album = Catalog::new(&session.db).add_album(actor, new)?;
    session.emit(&album, |album| {
        println!("✓ Added album {} by {} ({})", album.title, album.artist, album.id);
    })
}

/// Show an album with its tracks and approved reviews.
pub fn show_album(session: &Session, id: AlbumId) -> Result<()> {
    let catalog = Catalog::new(&session.db);
    let album = catalog.get_album(id)?;
    let tracks = catalog.list_tracks(id)?;
    let reviews = ReviewLifecycle::new(&session.db)
        .list_for_target(ReviewTarget::Album(id), Some(ReviewStatus::Approved))?;
    let likes = ReactionLedger::new(&session.db).count(ReactionTarget::Album(id))?;

    let value = json!({
        "album": album,
        "tracks": tracks,
        "approved_reviews": reviews,
        "likes": likes,
    });
    session.emit(&value, |_| {
        println!("{} by {}", album.title, album.artist);
        if let Some(year) = album.release_year {
            println!("  Released: {}", year);
        }
        println!("  Average rating: {:.2}", album.average_rating);
        println!("  Likes: {}", likes);
        println!("  Approved reviews: {}", reviews.len());
        if !tracks.is_empty() {
            println!("\n  Tracks:");
            for track in &tracks {
                println!("    {} ({})", track.title, track.id);
            }
        }
    })
}

pub fn list_albums(session: &Session, genre: Option<GenreId>) -> Result<()> {
    let albums = Catalog::new(&session.db).list_albums(genre)?;
    session.emit(&albums, |albums| {
        if albums.is_empty() {
            println!("No albums");
        }
        for album in albums {
            println!(
                "{:>6.2}  {} by {} ({})",
                album.average_rating, album.title, album.artist, album.id
            );
        }
    })
}

pub fn add_track(session: &Session, new: NewTrack) -> Result<()> {
    let actor = session.actor()?;
    let track = Catalog::new(&session.db).add_track(actor, new)?;
    session.emit(&track, |track| {
        println!("✓ Added track {} by {} ({})", track.title, track.artist, track.id);
    })
}

pub fn show_track(session: &Session, id: TrackId) -> Result<()> {
    let track = Catalog::new(&session.db).get_track(id)?;
    session.emit(&track, |track| {
        println!("{} by {}", track.title, track.artist);
        if let Some(album_id) = track.album_id {
            println!("  Album: {}", album_id);
        }
        if let Some(secs) = track.duration_secs {
            println!("  Duration: {}:{:02}", secs / 60, secs % 60);
        }
        println!("  Average rating: {:.2}", track.average_rating);
        println!("  Likes: {}", track.likes_count);
    })
}
