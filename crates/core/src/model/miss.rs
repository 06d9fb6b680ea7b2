use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{MissId, SongId, UserId};
use crate::model::vocab::VocabularyItem;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MissRecordError {
    #[error("miss count must be >= 1")]
    ZeroCount,

    #[error("last_missed_at is before created_at")]
    InvalidTimeRange,
}

/// Accumulated mistakes of one user on one word of one song.
///
/// Keyed by `(user_id, song_id, item.written())`; repeated misses bump
/// `miss_count` instead of creating new records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissRecord {
    id: MissId,
    user_id: UserId,
    song_id: SongId,
    item: VocabularyItem,
    miss_count: u32,
    last_missed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl MissRecord {
    /// Record for a first miss.
    #[must_use]
    pub fn first(
        id: MissId,
        user_id: UserId,
        song_id: SongId,
        item: VocabularyItem,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            song_id,
            item,
            miss_count: 1,
            last_missed_at: at,
            created_at: at,
        }
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `MissRecordError` when the count is zero or the timestamps are inverted.
    pub fn from_persisted(
        id: MissId,
        user_id: UserId,
        song_id: SongId,
        item: VocabularyItem,
        miss_count: u32,
        last_missed_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, MissRecordError> {
        if miss_count == 0 {
            return Err(MissRecordError::ZeroCount);
        }
        if last_missed_at < created_at {
            return Err(MissRecordError::InvalidTimeRange);
        }
        Ok(Self {
            id,
            user_id,
            song_id,
            item,
            miss_count,
            last_missed_at,
            created_at,
        })
    }

    /// Count another miss at `at`.
    pub fn register_miss(&mut self, at: DateTime<Utc>) {
        self.miss_count = self.miss_count.saturating_add(1);
        if at > self.last_missed_at {
            self.last_missed_at = at;
        }
    }

    /// Whether this record belongs to the `(user, song, written)` key.
    #[must_use]
    pub fn matches(&self, user_id: UserId, song_id: SongId, written: &str) -> bool {
        self.user_id == user_id && self.song_id == song_id && self.item.written() == written
    }

    /// Review priority: most misses first, then most recently missed.
    #[must_use]
    pub fn review_order(&self, other: &Self) -> Ordering {
        other
            .miss_count
            .cmp(&self.miss_count)
            .then_with(|| other.last_missed_at.cmp(&self.last_missed_at))
            .then_with(|| self.id.cmp(&other.id))
    }

    #[must_use]
    pub fn id(&self) -> MissId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn song_id(&self) -> SongId {
        self.song_id
    }

    #[must_use]
    pub fn item(&self) -> &VocabularyItem {
        &self.item
    }

    #[must_use]
    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    #[must_use]
    pub fn last_missed_at(&self) -> DateTime<Utc> {
        self.last_missed_at
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A miss record joined with the song it came from, for the review list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub miss: MissRecord,
    pub song_title: Option<String>,
    pub artist: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn record(id: u64, count: u32, minutes_ago: i64) -> MissRecord {
        let at = fixed_now() - Duration::minutes(minutes_ago);
        MissRecord::from_persisted(
            MissId::new(id),
            UserId::new(1),
            SongId::new(1),
            VocabularyItem::new(format!("w{id}"), "", "m").unwrap(),
            count,
            at,
            at - Duration::days(1),
        )
        .unwrap()
    }

    #[test]
    fn first_miss_starts_at_one() {
        let item = VocabularyItem::new("見る", "みる", "보다").unwrap();
        let rec = MissRecord::first(MissId::new(1), UserId::new(2), SongId::new(3), item, fixed_now());
        assert_eq!(rec.miss_count(), 1);
        assert_eq!(rec.created_at(), rec.last_missed_at());
        assert!(rec.matches(UserId::new(2), SongId::new(3), "見る"));
        assert!(!rec.matches(UserId::new(2), SongId::new(4), "見る"));
    }

    #[test]
    fn register_miss_increments_and_refreshes() {
        let mut rec = record(1, 2, 60);
        let later = fixed_now();
        rec.register_miss(later);
        assert_eq!(rec.miss_count(), 3);
        assert_eq!(rec.last_missed_at(), later);
    }

    #[test]
    fn persisted_zero_count_is_rejected() {
        let at = fixed_now();
        let err = MissRecord::from_persisted(
            MissId::new(1),
            UserId::new(1),
            SongId::new(1),
            VocabularyItem::new("a", "", "b").unwrap(),
            0,
            at,
            at,
        )
        .unwrap_err();
        assert_eq!(err, MissRecordError::ZeroCount);
    }

    #[test]
    fn review_order_prefers_count_then_recency() {
        let mut records = vec![record(1, 1, 0), record(2, 3, 90), record(3, 3, 10)];
        records.sort_by(MissRecord::review_order);
        let ids: Vec<u64> = records.iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
