pub mod evaluate;
pub mod index;
pub mod matcher;
pub mod persist;
pub mod rules;
pub mod similarity;
pub mod tfidf;
pub mod tokenizer;

pub use index::*;
pub use matcher::{match_query, match_query_with, FaqIndex, MatchConfig, MatchResult, ScoredDoc, DEFAULT_THRESHOLD};
pub use tokenizer::Language;

/// Reply shown when no answer clears the threshold.
pub const FALLBACK_REPLY: &str = "Maaf aku belum paham";
