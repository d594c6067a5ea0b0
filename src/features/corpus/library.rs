//! # Reminder Corpus
//!
//! Verse and hadith payloads embedded from `data/*.json` at compile time.
//! The collection is immutable after load and shared without
//! synchronization.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Hadith collection merged alongside verses
//! - 1.0.0: Initial verse collection with uniform random pick

use log::info;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verse payloads embedded at compile time
const VERSES_JSON: &str = include_str!("../../../data/verses.json");

/// Hadith payloads embedded at compile time
const HADITH_JSON: &str = include_str!("../../../data/hadith.json");

/// What kind of reminder a payload carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Verse,
    Hadith,
}

/// One reminder, chosen at fire time and handed to a display surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub id: String,
    pub kind: PayloadKind,
    /// Original Arabic text
    pub text: String,
    /// English rendering
    pub translation: String,
    /// Citation, e.g. "Qur'an 13:28" or "Sahih Muslim 2699"
    pub reference: String,
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("embedded corpus is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The loaded reminder collection
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    payloads: Vec<ReminderPayload>,
}

impl Corpus {
    /// Load and merge the embedded verse and hadith collections
    pub fn load_embedded() -> Result<Self, CorpusError> {
        let verses: Vec<ReminderPayload> = serde_json::from_str(VERSES_JSON)?;
        let hadith: Vec<ReminderPayload> = serde_json::from_str(HADITH_JSON)?;

        info!(
            "Loaded reminder corpus: {} verses, {} hadith",
            verses.len(),
            hadith.len()
        );

        let mut payloads = verses;
        payloads.extend(hadith);
        Ok(Corpus { payloads })
    }

    /// Build a corpus from explicit payloads (tests, future user corpora)
    pub fn from_payloads(payloads: Vec<ReminderPayload>) -> Self {
        Corpus { payloads }
    }

    pub fn payloads(&self) -> &[ReminderPayload] {
        &self.payloads
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Uniform random pick; the scheduler's default payload picker
pub fn pick_uniform(payloads: &[ReminderPayload]) -> Option<ReminderPayload> {
    payloads.choose(&mut rand::rng()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_corpus_loads() {
        let corpus = Corpus::load_embedded().unwrap();
        assert!(!corpus.is_empty());
        assert!(corpus.payloads().iter().any(|p| p.kind == PayloadKind::Verse));
        assert!(corpus.payloads().iter().any(|p| p.kind == PayloadKind::Hadith));
    }

    #[test]
    fn test_embedded_ids_are_unique() {
        let corpus = Corpus::load_embedded().unwrap();
        let mut ids: Vec<&str> = corpus.payloads().iter().map(|p| p.id.as_str()).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_pick_uniform_empty_returns_none() {
        assert!(pick_uniform(&[]).is_none());
    }

    #[test]
    fn test_pick_uniform_single_is_deterministic() {
        let payload = ReminderPayload {
            id: "only".to_string(),
            kind: PayloadKind::Verse,
            text: "text".to_string(),
            translation: "translation".to_string(),
            reference: "Qur'an 1:1".to_string(),
        };
        let picked = pick_uniform(std::slice::from_ref(&payload)).unwrap();
        assert_eq!(picked, payload);
    }
}
