use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use services::{
    Advance, CatalogService, Clock, FavoriteSubject, FavoritesService, QuizLoopService, QuizRun,
    ReviewService, SubmitOutcome,
};
use storage::repository::Storage;
use utavoca_core::model::{
    ArtistId, Direction, FavoriteId, FavoriteTarget, MissId, Question, QuizConfig, QuizMode, Song,
    SongId, UserId,
};

fn catalog(storage: &Storage) -> CatalogService {
    CatalogService::new(
        storage.artists.clone(),
        storage.songs.clone(),
        storage.favorites.clone(),
    )
}

fn favorites(storage: &Storage) -> FavoritesService {
    FavoritesService::new(
        Clock::default(),
        storage.favorites.clone(),
        storage.artists.clone(),
        storage.songs.clone(),
    )
}

fn song_line(song: &Song) -> String {
    format!(
        "{:>4}  {} / {} ({} words)",
        song.id(),
        song.title(),
        song.artist().name(),
        song.vocabulary().len()
    )
}

pub async fn list_songs(storage: &Storage, limit: u32) -> Result<()> {
    let songs = catalog(storage).songs(limit).await?;
    if songs.is_empty() {
        println!("No songs yet. Run the seed binary to add some.");
        return Ok(());
    }
    for song in &songs {
        println!("{}", song_line(song));
    }
    Ok(())
}

pub async fn list_artists(storage: &Storage, limit: u32) -> Result<()> {
    let artists = catalog(storage).artists(limit).await?;
    if artists.is_empty() {
        println!("No artists yet.");
        return Ok(());
    }
    for artist in artists {
        println!("{:>4}  {}", artist.id(), artist.name());
    }
    Ok(())
}

pub async fn show_artist(
    storage: &Storage,
    user_id: Option<UserId>,
    artist_id: ArtistId,
) -> Result<()> {
    let page = catalog(storage).artist_page(user_id, artist_id).await?;
    match page.favorite {
        Some(id) => println!("{} (favorite {id})", page.artist.name()),
        None => println!("{}", page.artist.name()),
    }
    if page.songs.is_empty() {
        println!("  no songs");
    }
    for song in &page.songs {
        println!("{}", song_line(song));
    }
    Ok(())
}

pub async fn add_favorite(storage: &Storage, user_id: UserId, target: FavoriteTarget) -> Result<()> {
    let favorite = favorites(storage).add(user_id, target).await?;
    println!("Added {target} to favorites as {}.", favorite.id);
    Ok(())
}

pub async fn remove_favorite(storage: &Storage, user_id: UserId, id: FavoriteId) -> Result<()> {
    favorites(storage)
        .remove(user_id, id)
        .await
        .with_context(|| format!("no favorite {id} for this user"))?;
    println!("Removed favorite {id}.");
    Ok(())
}

pub async fn list_favorites(storage: &Storage, user_id: UserId) -> Result<()> {
    let entries = favorites(storage).list(user_id).await?;
    if entries.is_empty() {
        println!("No favorites yet.");
        return Ok(());
    }
    for entry in &entries {
        let what = match &entry.subject {
            FavoriteSubject::Artist(artist) => format!("artist {}", artist.name()),
            FavoriteSubject::Song(song) => {
                format!("song {} / {}", song.title(), song.artist().name())
            }
            FavoriteSubject::Missing => format!("{} (removed)", entry.favorite.target),
        };
        println!(
            "{:>4}  {what}  since {}",
            entry.favorite.id,
            entry.favorite.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

pub async fn run_quiz(
    storage: &Storage,
    user_id: UserId,
    song_id: SongId,
    mode: QuizMode,
    count: u32,
) -> Result<()> {
    let config = QuizConfig::new(mode, count)?;
    let quiz = QuizLoopService::new(
        Clock::default(),
        storage.vocabulary.clone(),
        storage.misses.clone(),
    );
    let mut run = quiz
        .start_quiz(user_id, song_id, config)
        .await
        .with_context(|| format!("could not start a quiz for song {song_id}"))?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(question) = run.session.current_question() else {
            break;
        };
        let progress = run.session.progress();
        print_question(question, progress.position, progress.total);
        let answer_number = question.correct_index().map(|i| i + 1);

        let Some(choice) = read_choice(&mut input, question).await? else {
            info!(user_id = %user_id, song_id = %song_id, "quiz abandoned");
            println!("\nQuiz abandoned; nothing was recorded.");
            return Ok(());
        };

        if let SubmitOutcome::Recorded(record) = run.session.submit_answer(&choice) {
            if record.is_correct {
                println!("Correct!");
            } else {
                match answer_number {
                    Some(n) => println!("Wrong. The answer was {n}. {}", record.correct_answer),
                    None => println!("Wrong. The answer was: {}", record.correct_answer),
                }
            }
        }

        if finish_if_done(&quiz, &mut run).await {
            break;
        }
    }
    Ok(())
}

/// Prints the summary as soon as the quiz finishes, then records the misses.
async fn finish_if_done(quiz: &QuizLoopService, run: &mut QuizRun) -> bool {
    let result = quiz.advance(run);
    match result.advance {
        Advance::Next { .. } | Advance::Ignored => false,
        Advance::Finished { mistakes } => {
            let score = run.session.score();
            println!();
            match score.accuracy_percent() {
                Some(pct) => println!("Score: {}/{} ({pct}%)", score.correct, score.answered),
                None => println!("Score: 0/0"),
            }
            if score.is_perfect() {
                println!("Perfect run!");
            }
            if mistakes.is_empty() {
                println!("No mistakes.");
            } else {
                println!("Missed words:");
                for item in &mistakes {
                    println!("  {} ({}) - {}", item.written(), item.pronunciation(), item.meaning());
                }
            }
            if let Some(pending) = result.pending {
                let report = pending.flush().await;
                if report.failed > 0 {
                    println!(
                        "{} of {} missed words could not be saved for review.",
                        report.failed, report.attempted
                    );
                }
            }
            true
        }
    }
}

fn print_question(question: &Question, position: usize, total: usize) {
    println!();
    println!("[{position}/{total}] {}", question.prompt());
    let pronunciation = question.item().pronunciation();
    if question.direction() == Direction::WrittenToMeaning && !pronunciation.is_empty() {
        println!("        ({pronunciation})");
    }
    for (idx, choice) in question.choices().iter().enumerate() {
        println!("  {}. {choice}", idx + 1);
    }
}

/// Prompt until the learner picks a valid choice. `None` on end of input.
async fn read_choice(
    input: &mut Lines<BufReader<Stdin>>,
    question: &Question,
) -> Result<Option<String>> {
    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        match resolve_choice(&line, question.choices()) {
            Some(choice) => return Ok(Some(choice.to_owned())),
            None => println!("Pick 1-{}.", question.choices().len()),
        }
    }
}

/// Accepts a one-based number or the exact text of a choice.
fn resolve_choice<'a>(line: &str, choices: &'a [String]) -> Option<&'a str> {
    let trimmed = line.trim();
    if let Ok(n) = trimmed.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i)).map(String::as_str);
    }
    choices.iter().find(|c| c.as_str() == trimmed).map(String::as_str)
}

pub async fn show_review(storage: &Storage, user_id: UserId, limit: u32, all: bool) -> Result<()> {
    let review = ReviewService::new(storage.misses.clone(), storage.songs.clone());
    let entries = if all {
        review.all_misses(user_id).await?
    } else {
        review.review_queue(user_id, limit).await?
    };

    if entries.is_empty() {
        println!("Nothing to review.");
        return Ok(());
    }

    for entry in &entries {
        let miss = &entry.miss;
        let song = match (&entry.song_title, &entry.artist) {
            (Some(title), Some(artist)) => format!("{title} / {artist}"),
            (Some(title), None) => title.clone(),
            (None, _) => format!("song {}", miss.song_id()),
        };
        println!(
            "{:>4}  {} ({}) - {}  x{}  last {}  [{song}]",
            miss.id(),
            miss.item().written(),
            miss.item().pronunciation(),
            miss.item().meaning(),
            miss.miss_count(),
            miss.last_missed_at().format("%Y-%m-%d %H:%M"),
        );
    }

    let stats = review.stats(user_id).await?;
    if let Some(avg) = stats.average_miss_count {
        println!("\n{} missed words, {avg:.1} misses on average.", stats.total);
    }
    Ok(())
}

pub async fn forget(storage: &Storage, user_id: UserId, miss_id: MissId) -> Result<()> {
    let review = ReviewService::new(storage.misses.clone(), storage.songs.clone());
    review
        .forget(user_id, miss_id)
        .await
        .with_context(|| format!("no missed word {miss_id} for this user"))?;
    println!("Removed {miss_id} from the review list.");
    Ok(())
}
