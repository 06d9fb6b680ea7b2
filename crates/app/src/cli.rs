use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use utavoca_core::model::{
    ArtistId, DEFAULT_QUESTION_COUNT, FavoriteId, FavoriteTarget, MissId, QuizMode, SongId, UserId,
};

/// Vocabulary quizzes over the words of songs.
#[derive(Debug, Parser)]
#[command(name = "utavoca", version, about)]
pub struct Args {
    /// `SQLite` database URL or file path
    #[arg(long = "db", env = "UTAVOCA_DB_URL", default_value = "sqlite:utavoca.sqlite3")]
    pub db_url: String,

    /// Signed-in learner; required by quiz, review and favorite commands
    #[arg(long, env = "UTAVOCA_USER_ID")]
    pub user_id: Option<UserId>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List songs that have vocabulary
    Songs {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Run an interactive quiz over one song
    Quiz {
        #[arg(long)]
        song_id: SongId,
        /// jp-to-kr, kr-to-jp or random
        #[arg(long, default_value_t = QuizMode::default())]
        mode: QuizMode,
        #[arg(long, default_value_t = DEFAULT_QUESTION_COUNT)]
        count: u32,
    },
    /// Show missed words, most missed first
    Review {
        #[arg(long, default_value_t = services::DEFAULT_REVIEW_LIMIT)]
        limit: u32,
        /// Ignore --limit and list every missed word
        #[arg(long)]
        all: bool,
    },
    /// Remove a word from the review list
    Forget {
        #[arg(long)]
        miss_id: MissId,
    },
    /// List artists by name
    Artists {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Show an artist and their songs
    Artist {
        #[arg(long)]
        artist_id: ArtistId,
    },
    /// Manage favorite artists and songs
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoriteAction {
    /// Favorite a song or an artist
    Add {
        #[arg(long, conflicts_with = "artist_id", required_unless_present = "artist_id")]
        song_id: Option<SongId>,
        #[arg(long)]
        artist_id: Option<ArtistId>,
    },
    /// Remove a favorite by its id
    Remove {
        #[arg(long)]
        favorite_id: FavoriteId,
    },
    /// List favorites, newest first
    List,
}

/// The one target clap let through for `favorite add`.
pub fn favorite_target(song_id: Option<SongId>, artist_id: Option<ArtistId>) -> Option<FavoriteTarget> {
    song_id
        .map(FavoriteTarget::Song)
        .or(artist_id.map(FavoriteTarget::Artist))
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_owned();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file's directory exists before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow::anyhow!("invalid --db value: {db_url}"))?;
    let path = path.split('?').next().unwrap_or(path);
    anyhow::ensure!(!path.is_empty(), "invalid --db value: {db_url}");

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_url_is_kept() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn absolute_paths_gain_scheme() {
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/utavoca.db"),
            "sqlite:///tmp/utavoca.db"
        );
        assert_eq!(
            normalize_sqlite_url("/tmp/utavoca.db"),
            "sqlite:///tmp/utavoca.db"
        );
    }

    #[test]
    fn quiz_arguments_parse() {
        let args = Args::try_parse_from([
            "utavoca",
            "--user-id",
            "3",
            "quiz",
            "--song-id",
            "9",
            "--mode",
            "kr-to-jp",
            "--count",
            "5",
        ])
        .unwrap();
        assert_eq!(args.user_id, Some(UserId::new(3)));
        match args.command {
            Command::Quiz {
                song_id,
                mode,
                count,
            } => {
                assert_eq!(song_id, SongId::new(9));
                assert_eq!(mode, QuizMode::MeaningToWritten);
                assert_eq!(count, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn favorite_add_takes_exactly_one_target() {
        let args = Args::try_parse_from(["utavoca", "favorite", "add", "--artist-id", "4"]).unwrap();
        match args.command {
            Command::Favorite {
                action: FavoriteAction::Add { song_id, artist_id },
            } => assert_eq!(
                favorite_target(song_id, artist_id),
                Some(FavoriteTarget::Artist(ArtistId::new(4)))
            ),
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Args::try_parse_from(["utavoca", "favorite", "add"]).is_err());
        assert!(
            Args::try_parse_from([
                "utavoca", "favorite", "add", "--song-id", "1", "--artist-id", "2",
            ])
            .is_err()
        );
    }

    #[test]
    fn favorite_remove_parses_id() {
        let args =
            Args::try_parse_from(["utavoca", "favorite", "remove", "--favorite-id", "12"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Favorite {
                action: FavoriteAction::Remove { favorite_id }
            } if favorite_id == FavoriteId::new(12)
        ));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = Args::try_parse_from(["utavoca", "quiz", "--song-id", "1", "--mode", "sideways"]);
        assert!(err.is_err());
    }
}
