use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabularyError {
    #[error("written form cannot be empty")]
    EmptyWritten,

    #[error("meaning cannot be empty")]
    EmptyMeaning,
}

//
// ─── VOCABULARY ITEM ───────────────────────────────────────────────────────────
//

/// A single learnable word attached to a song.
///
/// The written form identifies the item within a song; two items may share a
/// meaning but never a written form in well-formed data. The persisted JSON
/// shape uses `name` for the written form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVocabularyItem", into = "RawVocabularyItem")]
pub struct VocabularyItem {
    written: String,
    pronunciation: String,
    meaning: String,
}

impl VocabularyItem {
    /// Build a vocabulary item, trimming every field.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError` when the written form or meaning is blank.
    pub fn new(
        written: impl Into<String>,
        pronunciation: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Result<Self, VocabularyError> {
        let written = written.into().trim().to_owned();
        let pronunciation = pronunciation.into().trim().to_owned();
        let meaning = meaning.into().trim().to_owned();

        if written.is_empty() {
            return Err(VocabularyError::EmptyWritten);
        }
        if meaning.is_empty() {
            return Err(VocabularyError::EmptyMeaning);
        }

        Ok(Self {
            written,
            pronunciation,
            meaning,
        })
    }

    #[must_use]
    pub fn written(&self) -> &str {
        &self.written
    }

    #[must_use]
    pub fn pronunciation(&self) -> &str {
        &self.pronunciation
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }
}

#[derive(Serialize, Deserialize)]
struct RawVocabularyItem {
    name: String,
    #[serde(default)]
    pronunciation: String,
    meaning: String,
}

impl TryFrom<RawVocabularyItem> for VocabularyItem {
    type Error = VocabularyError;

    fn try_from(raw: RawVocabularyItem) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.pronunciation, raw.meaning)
    }
}

impl From<VocabularyItem> for RawVocabularyItem {
    fn from(item: VocabularyItem) -> Self {
        Self {
            name: item.written,
            pronunciation: item.pronunciation,
            meaning: item.meaning,
        }
    }
}
