use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use storage::repository::Storage;
use utavoca_core::model::UserId;

mod cli;
mod commands;

use cli::{Args, Command, FavoriteAction};

/// Log targets start with the crate name, which for this binary is its bin
/// target name rather than the package name.
fn default_log_filter() -> String {
    format!("{}=info,services=info,storage=warn", env!("CARGO_CRATE_NAME"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with quiz output.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // The error is reported once, by the `Result` returned from `main`.
    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    let db_url = cli::normalize_sqlite_url(&args.db_url);
    cli::prepare_sqlite_file(&db_url)?;
    debug!(db_url = %db_url, "opening database");
    let storage = Storage::sqlite(&db_url).await?;

    match args.command {
        Command::Songs { limit } => commands::list_songs(&storage, limit).await,
        Command::Quiz {
            song_id,
            mode,
            count,
        } => commands::run_quiz(&storage, signed_in(args.user_id)?, song_id, mode, count).await,
        Command::Review { limit, all } => {
            commands::show_review(&storage, signed_in(args.user_id)?, limit, all).await
        }
        Command::Forget { miss_id } => {
            commands::forget(&storage, signed_in(args.user_id)?, miss_id).await
        }
        Command::Artists { limit } => commands::list_artists(&storage, limit).await,
        Command::Artist { artist_id } => {
            commands::show_artist(&storage, args.user_id, artist_id).await
        }
        Command::Favorite { action } => {
            let user_id = signed_in(args.user_id)?;
            match action {
                FavoriteAction::Add { song_id, artist_id } => {
                    let target = cli::favorite_target(song_id, artist_id)
                        .ok_or_else(|| anyhow!("pass --song-id or --artist-id"))?;
                    commands::add_favorite(&storage, user_id, target).await
                }
                FavoriteAction::Remove { favorite_id } => {
                    commands::remove_favorite(&storage, user_id, favorite_id).await
                }
                FavoriteAction::List => commands::list_favorites(&storage, user_id).await,
            }
        }
    }
}

/// Quizzes, reviews and favorites belong to a learner; without one there is nothing to record against.
fn signed_in(user_id: Option<UserId>) -> Result<UserId> {
    user_id.ok_or_else(|| anyhow!("sign-in required: pass --user-id or set UTAVOCA_USER_ID"))
}
