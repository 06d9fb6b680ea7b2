use chrono::Duration;
use storage::repository::{
    ArtistRepository, FavoritesRepository, MistakeTracker, SongRepository, StorageError,
    VocabularySource,
};
use storage::sqlite::SqliteRepository;
use utavoca_core::model::{
    Artist, ArtistId, FavoriteTarget, Song, SongId, UserId, VocabularyItem,
};
use utavoca_core::time::fixed_now;

fn item(written: &str, pron: &str, meaning: &str) -> VocabularyItem {
    VocabularyItem::new(written, pron, meaning).unwrap()
}

fn artist(id: u64, name: &str) -> Artist {
    Artist::new(ArtistId::new(id), name).unwrap()
}

fn sample_song(id: u64) -> Song {
    titled_song(id, "Everyday Verbs", artist(1, "Utavoca"))
}

fn titled_song(id: u64, title: &str, artist: Artist) -> Song {
    Song::new(
        SongId::new(id),
        title,
        artist,
        vec![
            item("見る", "みる", "보다"),
            item("聞く", "きく", "듣다"),
            item("話す", "はなす", "말하다"),
            item("読む", "よむ", "읽다"),
        ],
    )
    .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrips_song_vocabulary() {
    let repo = connect("memdb_songs").await;
    let song = sample_song(1);
    repo.upsert_song(&song).await.unwrap();

    let fetched = repo.get_song(song.id()).await.unwrap().expect("song");
    assert_eq!(fetched, song);

    let vocab = repo.fetch_vocabulary(song.id()).await.unwrap();
    assert_eq!(vocab.len(), 4);
    assert_eq!(vocab[2].written(), "話す");

    let listed = repo.list_songs(10).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn sqlite_missing_song_vocabulary_is_not_found() {
    let repo = connect("memdb_missing").await;
    let err = repo.fetch_vocabulary(SongId::new(404)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    assert!(repo.get_song(SongId::new(404)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_record_miss_upserts_with_increment() {
    let repo = connect("memdb_misses").await;
    let song = sample_song(1);
    repo.upsert_song(&song).await.unwrap();

    let user = UserId::new(7);
    let miru = item("見る", "みる", "보다");
    let t0 = fixed_now();

    let first = repo.record_miss(user, song.id(), &miru, t0).await.unwrap();
    assert_eq!(first.miss_count(), 1);
    assert_eq!(first.created_at(), t0);

    repo.record_miss(user, song.id(), &miru, t0 + Duration::minutes(1))
        .await
        .unwrap();
    let t2 = t0 + Duration::minutes(2);
    let third = repo.record_miss(user, song.id(), &miru, t2).await.unwrap();

    assert_eq!(third.id(), first.id());
    assert_eq!(third.miss_count(), 3);
    assert_eq!(third.last_missed_at(), t2);
    assert_eq!(third.created_at(), t0);
}

#[tokio::test]
async fn sqlite_lists_misses_in_review_order_and_deletes() {
    let repo = connect("memdb_review").await;
    let song = sample_song(1);
    repo.upsert_song(&song).await.unwrap();

    let user = UserId::new(1);
    let t0 = fixed_now();
    let kiku = item("聞く", "きく", "듣다");
    let yomu = item("読む", "よむ", "읽다");

    repo.record_miss(user, song.id(), &kiku, t0).await.unwrap();
    repo.record_miss(user, song.id(), &yomu, t0).await.unwrap();
    repo.record_miss(user, song.id(), &yomu, t0 + Duration::minutes(5))
        .await
        .unwrap();
    // Another learner's misses stay invisible.
    repo.record_miss(UserId::new(2), song.id(), &kiku, t0)
        .await
        .unwrap();

    let misses = repo.list_misses(user).await.unwrap();
    let words: Vec<&str> = misses.iter().map(|m| m.item().written()).collect();
    assert_eq!(words, vec!["読む", "聞く"]);

    let target = misses[1].id();
    let err = repo.delete_miss(UserId::new(2), target).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    repo.delete_miss(user, target).await.unwrap();
    assert!(repo.get_miss(user, target).await.unwrap().is_none());
    assert_eq!(repo.list_misses(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_song_upsert_registers_artist_and_lists_by_title() {
    let repo = connect("memdb_artists").await;
    let yoasobi = artist(2, "YOASOBI");
    repo.upsert_song(&titled_song(10, "Yoru ni Kakeru", yoasobi.clone()))
        .await
        .unwrap();
    repo.upsert_song(&titled_song(11, "Idol", yoasobi.clone()))
        .await
        .unwrap();
    repo.upsert_song(&sample_song(1)).await.unwrap();

    assert_eq!(repo.get_artist(yoasobi.id()).await.unwrap(), Some(yoasobi.clone()));
    let names: Vec<String> = repo
        .list_artists(10)
        .await
        .unwrap()
        .iter()
        .map(|a| a.name().to_owned())
        .collect();
    assert_eq!(names, vec!["Utavoca", "YOASOBI"]);

    let titles: Vec<String> = repo
        .list_songs_by_artist(yoasobi.id())
        .await
        .unwrap()
        .iter()
        .map(|s| s.title().to_owned())
        .collect();
    assert_eq!(titles, vec!["Idol", "Yoru ni Kakeru"]);

    // Renaming through a song upsert updates the shared artist row.
    repo.upsert_song(&titled_song(11, "Idol", artist(2, "Yoasobi")))
        .await
        .unwrap();
    let song = repo.get_song(SongId::new(10)).await.unwrap().expect("song");
    assert_eq!(song.artist().name(), "Yoasobi");
}

#[tokio::test]
async fn sqlite_favorites_reject_duplicates_and_scope_removal() {
    let repo = connect("memdb_favorites").await;
    let user = UserId::new(5);
    let song = FavoriteTarget::Song(SongId::new(1));
    let singer = FavoriteTarget::Artist(ArtistId::new(1));
    let t0 = fixed_now();

    let first = repo.add_favorite(user, song, t0).await.unwrap();
    assert_eq!(first.target, song);
    assert_eq!(first.created_at, t0);

    let err = repo.add_favorite(user, song, t0).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let second = repo
        .add_favorite(user, singer, t0 + Duration::minutes(1))
        .await
        .unwrap();
    let listed = repo.list_favorites(user).await.unwrap();
    assert_eq!(listed, vec![second.clone(), first.clone()]);
    assert!(repo.list_favorites(UserId::new(6)).await.unwrap().is_empty());

    let err = repo
        .remove_favorite(UserId::new(6), first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    repo.remove_favorite(user, first.id).await.unwrap();
    assert!(repo.find_favorite(user, song).await.unwrap().is_none());
    assert_eq!(repo.find_favorite(user, singer).await.unwrap(), Some(second));
}
