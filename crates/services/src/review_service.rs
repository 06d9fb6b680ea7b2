use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::info;

use storage::repository::{MistakeTracker, SongRepository, StorageError};
use utavoca_core::model::{MissId, MissRecord, ReviewEntry, Song, SongId, UserId};

use crate::error::ReviewServiceError;

/// Number of words shown in a review queue when the caller does not choose.
pub const DEFAULT_REVIEW_LIMIT: u32 = 10;

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Headline numbers for a learner's missed words.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewStats {
    pub total: usize,
    pub most_missed: Option<MissRecord>,
    pub average_miss_count: Option<f64>,
}

impl ReviewStats {
    fn from_misses(misses: &[MissRecord]) -> Self {
        let total = misses.len();
        let sum: u64 = misses.iter().map(|m| u64::from(m.miss_count())).sum();

        // Precision loss only matters far beyond realistic miss counts.
        #[allow(clippy::cast_precision_loss)]
        let average_miss_count = (total > 0).then(|| sum as f64 / total as f64);

        Self {
            total,
            most_missed: misses.first().cloned(),
            average_miss_count,
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Review list over the mistake tracker, most-missed words first.
#[derive(Clone)]
pub struct ReviewService {
    misses: Arc<dyn MistakeTracker>,
    songs: Arc<dyn SongRepository>,
}

impl ReviewService {
    #[must_use]
    pub fn new(misses: Arc<dyn MistakeTracker>, songs: Arc<dyn SongRepository>) -> Self {
        Self { misses, songs }
    }

    /// Up to `limit` missed words, ordered by miss count then recency.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` for backend failures.
    pub async fn review_queue(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ReviewEntry>, ReviewServiceError> {
        let mut misses = self.misses.list_misses(user_id).await?;
        misses.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        self.with_songs(misses).await
    }

    /// Every missed word of the learner, in review order.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` for backend failures.
    pub async fn all_misses(&self, user_id: UserId) -> Result<Vec<ReviewEntry>, ReviewServiceError> {
        let misses = self.misses.list_misses(user_id).await?;
        self.with_songs(misses).await
    }

    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` for backend failures.
    pub async fn stats(&self, user_id: UserId) -> Result<ReviewStats, ReviewServiceError> {
        let misses = self.misses.list_misses(user_id).await?;
        Ok(ReviewStats::from_misses(&misses))
    }

    /// Drop a word from the learner's review list.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` with `StorageError::NotFound` when the
    /// learner owns no such record.
    pub async fn forget(&self, user_id: UserId, miss_id: MissId) -> Result<(), ReviewServiceError> {
        self.misses.delete_miss(user_id, miss_id).await?;
        info!(user_id = %user_id, miss_id = %miss_id, "missed word removed from review");
        Ok(())
    }

    async fn with_songs(
        &self,
        misses: Vec<MissRecord>,
    ) -> Result<Vec<ReviewEntry>, ReviewServiceError> {
        let mut songs: HashMap<SongId, Option<Song>> = HashMap::new();
        let mut out = Vec::with_capacity(misses.len());

        for miss in misses {
            let song = match songs.entry(miss.song_id()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    let song = match self.songs.get_song(miss.song_id()).await {
                        Ok(song) => song,
                        Err(StorageError::NotFound) => None,
                        Err(e) => return Err(e.into()),
                    };
                    e.insert(song)
                }
            };

            out.push(ReviewEntry {
                song_title: song.as_ref().map(|s| s.title().to_owned()),
                artist: song.as_ref().map(|s| s.artist().name().to_owned()),
                miss,
            });
        }
        Ok(out)
    }
}
