use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use services::{
    Advance, AdvanceResult, Clock, MistakeReport, QuizLoopError, QuizLoopService, QuizPhase,
    QuizRun, Score,
};
use storage::repository::{
    InMemoryRepository, MistakeTracker, SongRepository, StorageError, VocabularySource,
};
use utavoca_core::model::{
    Artist, ArtistId, MissId, MissRecord, QuizConfig, QuizMode, Song, SongId, UserId,
    VocabularyItem,
};
use utavoca_core::time::fixed_now;

const USER: UserId = UserId::new(1);

fn vocab() -> Vec<VocabularyItem> {
    vec![
        VocabularyItem::new("見る", "みる", "보다").unwrap(),
        VocabularyItem::new("聞く", "きく", "듣다").unwrap(),
        VocabularyItem::new("話す", "はなす", "말하다").unwrap(),
        VocabularyItem::new("読む", "よむ", "읽다").unwrap(),
    ]
}

fn artist() -> Artist {
    Artist::new(ArtistId::new(1), "Utavoca").unwrap()
}

async fn seeded_repo() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    let song = Song::new(SongId::new(1), "Everyday Verbs", artist(), vocab()).unwrap();
    repo.upsert_song(&song).await.unwrap();
    repo
}

fn loop_service(repo: &InMemoryRepository, tracker: Arc<dyn MistakeTracker>) -> QuizLoopService {
    let vocabulary: Arc<dyn VocabularySource> = Arc::new(repo.clone());
    QuizLoopService::new(Clock::fixed(fixed_now()), vocabulary, tracker)
}

fn config() -> QuizConfig {
    QuizConfig::new(QuizMode::WrittenToMeaning, 4).unwrap()
}

/// Answers every question; `pick` returns the chosen text for a written form.
fn play(
    svc: &QuizLoopService,
    run: &mut QuizRun,
    pick: impl Fn(&str, &str) -> String,
) -> AdvanceResult {
    loop {
        let question = run.session.current_question().expect("active").clone();
        let choice = pick(question.item().written(), question.correct_answer());
        run.session.submit_answer(&choice);
        let result = svc.advance(run);
        if matches!(result.advance, Advance::Finished { .. }) {
            return result;
        }
    }
}

async fn flush(result: AdvanceResult) -> MistakeReport {
    result.pending.expect("pending report on finish").flush().await
}

#[tokio::test]
async fn all_correct_reports_nothing() {
    let repo = seeded_repo().await;
    let svc = loop_service(&repo, Arc::new(repo.clone()));

    let mut run = svc.start_quiz(USER, SongId::new(1), config()).await.unwrap();
    assert_eq!(run.session.questions().len(), 4);

    let result = play(&svc, &mut run, |_, correct| correct.to_owned());
    assert_eq!(result.advance, Advance::Finished { mistakes: vec![] });
    let report = flush(result).await;
    assert_eq!(report.attempted, 0);

    assert_eq!(
        run.session.score(),
        Score {
            correct: 4,
            answered: 4
        }
    );
    assert!(repo.list_misses(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn one_miss_increments_existing_record() {
    let repo = seeded_repo().await;
    let miru = vocab()[0].clone();
    let earlier = fixed_now() - Duration::days(2);
    repo.record_miss(USER, SongId::new(1), &miru, earlier).await.unwrap();
    repo.record_miss(USER, SongId::new(1), &miru, earlier).await.unwrap();

    let svc = loop_service(&repo, Arc::new(repo.clone()));
    let mut run = svc.start_quiz(USER, SongId::new(1), config()).await.unwrap();

    let result = play(&svc, &mut run, |written, correct| {
        if written == "見る" {
            "듣다".to_owned()
        } else {
            correct.to_owned()
        }
    });

    assert_eq!(
        result.advance,
        Advance::Finished {
            mistakes: vec![miru.clone()]
        }
    );
    let report = flush(result).await;
    assert_eq!((report.attempted, report.recorded, report.failed), (1, 1, 0));
    assert_eq!(
        run.session.score(),
        Score {
            correct: 3,
            answered: 4
        }
    );

    let misses = repo.list_misses(USER).await.unwrap();
    assert_eq!(misses.len(), 1);
    assert_eq!(misses[0].item().written(), "見る");
    assert_eq!(misses[0].miss_count(), 3);
    assert_eq!(misses[0].last_missed_at(), fixed_now());
}

/// Tracker that rejects one word and delegates the rest.
struct FlakyTracker {
    inner: InMemoryRepository,
    reject: &'static str,
}

#[async_trait]
impl MistakeTracker for FlakyTracker {
    async fn record_miss(
        &self,
        user_id: UserId,
        song_id: SongId,
        item: &VocabularyItem,
        at: DateTime<Utc>,
    ) -> Result<MissRecord, StorageError> {
        if item.written() == self.reject {
            return Err(StorageError::Connection("tracker unavailable".into()));
        }
        self.inner.record_miss(user_id, song_id, item, at).await
    }

    async fn list_misses(&self, user_id: UserId) -> Result<Vec<MissRecord>, StorageError> {
        self.inner.list_misses(user_id).await
    }

    async fn get_miss(
        &self,
        user_id: UserId,
        id: MissId,
    ) -> Result<Option<MissRecord>, StorageError> {
        self.inner.get_miss(user_id, id).await
    }

    async fn delete_miss(&self, user_id: UserId, id: MissId) -> Result<(), StorageError> {
        self.inner.delete_miss(user_id, id).await
    }
}

#[tokio::test]
async fn failed_report_is_isolated_from_others_and_the_score() {
    let repo = seeded_repo().await;
    let tracker = FlakyTracker {
        inner: repo.clone(),
        reject: "聞く",
    };
    let svc = loop_service(&repo, Arc::new(tracker));
    let mut run = svc.start_quiz(USER, SongId::new(1), config()).await.unwrap();

    // Miss everything.
    let result = play(&svc, &mut run, |_, correct| {
        if correct == "보다" {
            "읽다".to_owned()
        } else {
            "보다".to_owned()
        }
    });

    let report = flush(result).await;
    assert_eq!((report.attempted, report.recorded, report.failed), (4, 3, 1));
    assert_eq!(run.session.phase(), QuizPhase::Finished);
    assert_eq!(
        run.session.score(),
        Score {
            correct: 0,
            answered: 4
        }
    );

    let recorded: Vec<String> = repo
        .list_misses(USER)
        .await
        .unwrap()
        .iter()
        .map(|m| m.item().written().to_owned())
        .collect();
    assert_eq!(recorded.len(), 3);
    assert!(!recorded.iter().any(|w| w == "聞く"));
}

#[tokio::test]
async fn advancing_a_finished_run_does_not_report_again() {
    let repo = seeded_repo().await;
    let svc = loop_service(&repo, Arc::new(repo.clone()));
    let mut run = svc.start_quiz(USER, SongId::new(1), config()).await.unwrap();

    flush(play(&svc, &mut run, |_, _| "없음".to_owned())).await;
    let again = svc.advance(&mut run);
    assert_eq!(again.advance, Advance::Ignored);
    assert!(again.pending.is_none());

    let misses = repo.list_misses(USER).await.unwrap();
    assert_eq!(misses.len(), 4);
    assert!(misses.iter().all(|m| m.miss_count() == 1));
}

#[tokio::test]
async fn score_is_final_before_misses_are_recorded() {
    let repo = seeded_repo().await;
    let svc = loop_service(&repo, Arc::new(repo.clone()));
    let mut run = svc.start_quiz(USER, SongId::new(1), config()).await.unwrap();

    let result = play(&svc, &mut run, |_, _| "없음".to_owned());
    assert_eq!(run.session.phase(), QuizPhase::Finished);
    assert_eq!(run.session.score().answered, 4);

    let pending = result.pending.expect("pending report on finish");
    assert_eq!(pending.mistakes().len(), 4);
    assert!(repo.list_misses(USER).await.unwrap().is_empty());

    let report = pending.flush().await;
    assert_eq!(report.recorded, 4);
    assert_eq!(repo.list_misses(USER).await.unwrap().len(), 4);
}

#[tokio::test]
async fn small_vocabulary_and_missing_song_block_start() {
    let repo = InMemoryRepository::new();
    let small = Song::new(SongId::new(2), "Short", artist(), vocab()[..3].to_vec()).unwrap();
    repo.upsert_song(&small).await.unwrap();
    let svc = loop_service(&repo, Arc::new(repo.clone()));

    let err = svc.start_quiz(USER, SongId::new(2), config()).await.unwrap_err();
    assert!(matches!(err, QuizLoopError::Session(_)));

    let err = svc.start_quiz(USER, SongId::new(9), config()).await.unwrap_err();
    assert!(matches!(err, QuizLoopError::Storage(StorageError::NotFound)));
}

#[tokio::test]
async fn restart_starts_an_independent_session() {
    let repo = seeded_repo().await;
    let svc = loop_service(&repo, Arc::new(repo.clone()));
    let mut run = svc.start_quiz(USER, SongId::new(1), config()).await.unwrap();
    flush(play(&svc, &mut run, |_, correct| correct.to_owned())).await;

    svc.restart_quiz(&mut run, QuizConfig::new(QuizMode::Mixed, 2).unwrap())
        .await
        .unwrap();

    assert_eq!(run.session.phase(), QuizPhase::Active);
    assert_eq!(run.session.current_index(), 0);
    assert!(run.session.answers().is_empty());
    assert_eq!(run.session.questions().len(), 2);
}
