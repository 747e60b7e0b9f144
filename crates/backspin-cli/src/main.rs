use anyhow::Result;
use backspin_core::model::{AlbumId, Decision, GenreId, ReviewId, ReviewStatus, TrackId};
use backspin_engine::{Config, NewAlbum, NewTrack};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod commands;

use commands::review::RatingArgs;
use commands::{KindArg, Session};

#[derive(Debug, Parser)]
#[command(name = "backspin", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/backspin/backspin.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Act as the registered user with this handle
    #[arg(long = "as", value_name = "HANDLE", global = true)]
    as_handle: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Manage genres (adding requires an admin)
    #[command(subcommand)]
    Genre(GenreCommand),

    /// Manage albums (adding requires an admin)
    #[command(subcommand)]
    Album(AlbumCommand),

    /// Manage tracks (adding requires an admin)
    #[command(subcommand)]
    Track(TrackCommand),

    /// Write, edit and moderate reviews
    ///
    /// A review rates an album or a track on rhymes, structure,
    /// implementation and individuality (1-10 each) plus an atmosphere
    /// value (1-10). The final score is derived from these and cannot be
    /// set directly.
    ///
    /// New and edited reviews wait in the moderation queue until an admin
    /// approves or rejects them. Only approved reviews count towards an
    /// album's or track's average rating.
    #[command(subcommand)]
    Review(ReviewCommand),

    /// Like an album, track or review
    Like {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
    },

    /// Remove a like
    Unlike {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
    },

    /// Count the likes on an album, track or review
    Likes {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
    },

    /// List what you have liked
    Liked {
        #[arg(value_enum)]
        kind: KindArg,
    },

    /// Compute a score without saving a review
    Score {
        #[command(flatten)]
        ratings: RatingFlags,

        /// Atmosphere (1-10)
        #[arg(long)]
        atmosphere: u8,
    },

    /// Show database status
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, clap::Subcommand)]
enum UserCommand {
    /// Register a user
    Add {
        handle: String,

        /// Grant admin rights. Needs --as naming an admin once one exists
        #[arg(long)]
        admin: bool,
    },
    /// List users
    List,
}

#[derive(Debug, clap::Subcommand)]
enum GenreCommand {
    /// Add a genre
    Add { name: String },
    /// List genres
    List,
}

#[derive(Debug, clap::Subcommand)]
enum AlbumCommand {
    /// Add an album
    Add {
        title: String,
        artist: String,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        genre: Option<GenreId>,
    },
    /// Show an album with its tracks
    Show { id: AlbumId },
    /// List albums, best rated first
    List {
        #[arg(long)]
        genre: Option<GenreId>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum TrackCommand {
    /// Add a track
    Add {
        title: String,
        artist: String,

        #[arg(long)]
        album: Option<AlbumId>,

        /// Duration in seconds
        #[arg(long)]
        duration: Option<i64>,
    },
    /// Show a track
    Show { id: TrackId },
}

#[derive(Debug, Clone, Copy, clap::Args)]
struct RatingFlags {
    /// Rhymes (1-10)
    #[arg(long)]
    rhymes: Option<u8>,

    /// Structure (1-10)
    #[arg(long)]
    structure: Option<u8>,

    /// Implementation (1-10)
    #[arg(long)]
    implementation: Option<u8>,

    /// Individuality (1-10)
    #[arg(long)]
    individuality: Option<u8>,
}

impl From<RatingFlags> for RatingArgs {
    fn from(flags: RatingFlags) -> Self {
        Self {
            rhymes: flags.rhymes,
            structure: flags.structure,
            implementation: flags.implementation,
            individuality: flags.individuality,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DecisionArg {
    Approve,
    Reject,
}

impl From<DecisionArg> for Decision {
    fn from(decision: DecisionArg) -> Self {
        match decision {
            DecisionArg::Approve => Self::Approve,
            DecisionArg::Reject => Self::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for ReviewStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => Self::Pending,
            StatusArg::Approved => Self::Approved,
            StatusArg::Rejected => Self::Rejected,
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum ReviewCommand {
    /// Review an album or a track
    Create {
        #[arg(long, conflicts_with = "track", required_unless_present = "track")]
        album: Option<AlbumId>,

        #[arg(long)]
        track: Option<TrackId>,

        #[command(flatten)]
        ratings: RatingFlags,

        /// Atmosphere (1-10)
        #[arg(long)]
        atmosphere: u8,

        #[arg(long)]
        text: Option<String>,
    },
    /// Edit your review; it returns to the moderation queue
    Edit {
        id: ReviewId,

        #[command(flatten)]
        ratings: RatingFlags,

        #[arg(long)]
        atmosphere: Option<u8>,

        #[arg(long)]
        text: Option<String>,
    },
    /// Approve or reject a pending review (admin)
    Moderate {
        id: ReviewId,

        #[arg(value_enum)]
        decision: DecisionArg,
    },
    /// Delete a review (author or admin)
    Delete { id: ReviewId },
    /// Show a review
    Show { id: ReviewId },
    /// List reviews of an album, a track or an author
    List {
        #[arg(long, group = "subject")]
        album: Option<AlbumId>,

        #[arg(long, group = "subject")]
        track: Option<TrackId>,

        /// Handle of the author
        #[arg(long, group = "subject")]
        author: Option<String>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Show the moderation queue (admin)
    Pending,
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Create a config file with defaults
    Init,
    /// Print an example config file
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.db.clone() {
        Some(path) => Config::load_with_db_path(path)?,
        None => Config::load()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Commands that need no database.
    match &cli.command {
        Commands::Config(command) => {
            return match command {
                ConfigCommand::Show => commands::config::show_config(&config),
                ConfigCommand::Path => commands::config::show_path(),
                ConfigCommand::Init => commands::config::init_config(),
                ConfigCommand::Example => commands::config::show_example(),
            };
        }
        Commands::Score {
            ratings,
            atmosphere,
        } => {
            return commands::score::show_score((*ratings).into(), *atmosphere, cli.json);
        }
        _ => {}
    }

    log::debug!("Using database {}", config.database_path.display());
    let session = Session::open(&config, cli.as_handle, cli.json)?;

    match cli.command {
        Commands::User(command) => match command {
            UserCommand::Add { handle, admin } => {
                commands::user::add_user(&session, &handle, admin)?;
            }
            UserCommand::List => commands::user::list_users(&session)?,
        },
        Commands::Genre(command) => match command {
            GenreCommand::Add { name } => commands::catalog::add_genre(&session, &name)?,
            GenreCommand::List => commands::catalog::list_genres(&session)?,
        },
        Commands::Album(command) => match command {
            AlbumCommand::Add {
                title,
                artist,
                year,
                genre,
            } => commands::catalog::add_album(
                &session,
                NewAlbum {
                    title,
                    artist,
                    release_year: year,
                    genre_id: genre,
                },
            )?,
            AlbumCommand::Show { id } => commands::catalog::show_album(&session, id)?,
            AlbumCommand::List { genre } => commands::catalog::list_albums(&session, genre)?,
        },
        Commands::Track(command) => match command {
            TrackCommand::Add {
                title,
                artist,
                album,
                duration,
            } => commands::catalog::add_track(
                &session,
                NewTrack {
                    title,
                    artist,
                    album_id: album,
                    duration_secs: duration,
                },
            )?,
            TrackCommand::Show { id } => commands::catalog::show_track(&session, id)?,
        },
        Commands::Review(command) => match command {
            ReviewCommand::Create {
                album,
                track,
                ratings,
                atmosphere,
                text,
            } => commands::review::create(
                &session,
                album,
                track,
                ratings.into(),
                atmosphere,
                text,
            )?,
            ReviewCommand::Edit {
                id,
                ratings,
                atmosphere,
                text,
            } => commands::review::edit(&session, id, ratings.into(), atmosphere, text)?,
            ReviewCommand::Moderate { id, decision } => {
                commands::review::moderate(&session, id, decision.into())?;
            }
            ReviewCommand::Delete { id } => commands::review::delete(&session, id)?,
            ReviewCommand::Show { id } => commands::review::show(&session, id)?,
            ReviewCommand::List {
                album,
                track,
                author,
                status,
            } => commands::review::list(&session, album, track, author, status.map(Into::into))?,
            ReviewCommand::Pending => commands::review::pending(&session)?,
        },
        Commands::Like { kind, id } => commands::like::like(&session, kind, &id)?,
        Commands::Unlike { kind, id } => commands::like::unlike(&session, kind, &id)?,
        Commands::Likes { kind, id } => commands::like::likes(&session, kind, &id)?,
        Commands::Liked { kind } => commands::like::liked(&session, kind)?,
        Commands::Status => commands::status::show_status(&session, &config.database_path)?,
        Commands::Config(_) | Commands::Score { .. } => {}
    }

    Ok(())
}
