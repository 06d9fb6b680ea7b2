use std::fmt;

use storage::repository::Storage;
use utavoca_core::model::{Artist, ArtistId, Song, SongId, VocabularyItem};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    first_song_id: u64,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSongId { raw: String },
    SongIdOverflow { first: u64 },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSongId { raw } => write!(f, "invalid --first-song-id value: {raw}"),
            ArgsError::SongIdOverflow { first } => {
                write!(f, "--first-song-id {first} leaves no room for the sample songs")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("UTAVOCA_DB_URL").unwrap_or_else(|_| "sqlite:utavoca.sqlite3".into());
        let mut first_song_id = 1_u64;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--first-song-id" => {
                    let value = require_value(&mut args, "--first-song-id")?;
                    first_song_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSongId { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            first_song_id,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:utavoca.sqlite3)");
    eprintln!("  --first-song-id <id>      Id of the first seeded song (default: 1)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  UTAVOCA_DB_URL");
}

type SampleSong = (
    &'static str,
    u64,
    &'static [(&'static str, &'static str, &'static str)],
);

const SAMPLE_ARTISTS: &[(u64, &str)] = &[(1, "Utavoca Basics"), (2, "Night Owls")];

const SAMPLES: &[SampleSong] = &[
    (
        "Everyday Verbs",
        1,
        &[
            ("見る", "みる", "보다"),
            ("聞く", "きく", "듣다"),
            ("話す", "はなす", "말하다"),
            ("読む", "よむ", "읽다"),
        ],
    ),
    (
        "Night Sky",
        2,
        &[
            ("光", "ひかり", "빛"),
            ("夢", "ゆめ", "꿈"),
            ("星", "ほし", "별"),
            ("空", "そら", "하늘"),
            ("夜", "よる", "밤"),
            ("月", "つき", "달"),
        ],
    ),
];

/// Ids for the sample songs, starting at `first`.
fn sample_song_ids(first: u64) -> Result<Vec<SongId>, ArgsError> {
    (0..SAMPLES.len() as u64)
        .map(|offset| {
            first
                .checked_add(offset)
                .map(SongId::new)
                .ok_or(ArgsError::SongIdOverflow { first })
        })
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let song_ids = sample_song_ids(args.first_song_id)?;

    let storage = Storage::sqlite(&args.db_url).await?;

    let mut seeded = 0_usize;
    for ((title, artist_id, words), song_id) in SAMPLES.iter().zip(song_ids) {
        let name = SAMPLE_ARTISTS
            .iter()
            .find(|(id, _)| id == artist_id)
            .map_or("Unknown", |(_, name)| *name);
        let artist = Artist::new(ArtistId::new(*artist_id), name)?;
        let vocabulary = words
            .iter()
            .map(|(written, pron, meaning)| VocabularyItem::new(*written, *pron, *meaning))
            .collect::<Result<Vec<_>, _>>()?;
        let song = Song::new(song_id, *title, artist, vocabulary)?;
        storage.songs.upsert_song(&song).await?;
        seeded += 1;
    }

    println!("Seeded {seeded} songs into {}", args.db_url);

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_ids_are_consecutive() {
        assert_eq!(
            sample_song_ids(10).unwrap(),
            vec![SongId::new(10), SongId::new(11)]
        );
    }

    #[test]
    fn sample_ids_near_the_top_are_rejected() {
        let err = sample_song_ids(u64::MAX).unwrap_err();
        assert!(matches!(err, ArgsError::SongIdOverflow { first } if first == u64::MAX));
    }
}
