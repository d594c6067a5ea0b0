//! # Corpus Feature
//!
//! Static read-only collection of verse and hadith reminder payloads,
//! embedded at compile time and picked from uniformly at fire time.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod library;

pub use library::{pick_uniform, Corpus, CorpusError, PayloadKind, ReminderPayload};
