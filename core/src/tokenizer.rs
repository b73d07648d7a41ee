use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Tokens with this many characters or fewer are dropped.
pub const MIN_TOKEN_CHARS: usize = 3;

lazy_static! {
    // applied after lowercasing, so only ASCII letters and digits survive
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9\s]").expect("valid regex");
    static ref INDONESIAN: HashSet<&'static str> = {
        let words: &[&str] = &[
            "apa","apakah","yang","dan","di","ke","dari","berapa",
            "saya","kamu","kami","bisa","untuk","ya","dong",
            "tolong","mau","ingin","nih","itu","ini",
        ];
        words.iter().copied().collect()
    };
    static ref ENGLISH: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves",
        ];
        words.iter().copied().collect()
    };
}

/// Stopword set applied during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Indonesian,
    English,
}

impl Language {
    fn stopwords(self) -> &'static HashSet<&'static str> {
        match self {
            Language::Indonesian => &INDONESIAN,
            Language::English => &ENGLISH,
        }
    }

    pub fn is_stopword(self, token: &str) -> bool { self.stopwords().contains(token) }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "id" | "indonesian" => Ok(Language::Indonesian),
            "en" | "english" => Ok(Language::English),
            other => Err(anyhow::anyhow!("unknown language {other:?}, expected indonesian or english")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Indonesian => f.write_str("indonesian"),
            Language::English => f.write_str("english"),
        }
    }
}

/// Normalize text with the default (Indonesian) stopword set.
pub fn normalize(text: &str) -> Vec<String> { normalize_with(text, Language::default()) }

/// Lowercase, strip everything but ASCII letters, digits and whitespace, split on
/// whitespace, then drop stopwords and tokens shorter than [`MIN_TOKEN_CHARS`].
/// Duplicates are kept.
pub fn normalize_with(text: &str, language: Language) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_ALNUM.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .filter(|w| !language.is_stopword(w) && w.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}
