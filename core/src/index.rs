use crate::tokenizer::{normalize_with, Language};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Position of a document in the corpus.
pub type DocId = usize;

pub type TermCounts = HashMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub question: String,
    pub answer: String,
}

impl Document {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }
}

/// Sparse term -> weight mapping. Absent terms weigh 0. Ordered by term so sums
/// are reproducible across vectors with the same content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermVector(BTreeMap<String, f64>);

impl TermVector {
    pub fn new() -> Self { Self::default() }

    /// Raw occurrence counts, used for query vectors.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut v = BTreeMap::new();
        for t in tokens {
            *v.entry(t.into()).or_insert(0.0) += 1.0;
        }
        Self(v)
    }

    pub fn get(&self, term: &str) -> f64 { self.0.get(term).copied().unwrap_or(0.0) }
    pub fn insert(&mut self, term: impl Into<String>, weight: f64) { self.0.insert(term.into(), weight); }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> { self.0.iter().map(|(k, v)| (k.as_str(), *v)) }

    pub fn magnitude(&self) -> f64 { self.0.values().map(|w| w * w).sum::<f64>().sqrt() }
}

impl FromIterator<(String, f64)> for TermVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self { Self(iter.into_iter().collect()) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusIndex {
    pub num_docs: u32,
    /// Number of documents containing each term at least once.
    pub df: HashMap<String, u32>,
}

impl CorpusIndex {
    pub fn doc_freq(&self, term: &str) -> u32 { self.df.get(term).copied().unwrap_or(0) }
}

/// Output of the statistics pass: per-document counts plus the corpus index.
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    pub term_counts: Vec<TermCounts>,
    pub index: CorpusIndex,
}

/// Count terms per document and document frequencies over the whole corpus.
pub fn build_statistics<S: AsRef<str>>(texts: &[S], language: Language) -> CorpusStats {
    let mut df: HashMap<String, u32> = HashMap::new();
    let mut term_counts = Vec::with_capacity(texts.len());
    for text in texts {
        let mut counts: TermCounts = HashMap::new();
        for token in normalize_with(text.as_ref(), language) {
            *counts.entry(token).or_insert(0) += 1;
        }
        // one increment per distinct term, regardless of occurrences
        for term in counts.keys() {
            *df.entry(term.clone()).or_insert(0) += 1;
        }
        term_counts.push(counts);
    }
    CorpusStats { term_counts, index: CorpusIndex { num_docs: texts.len() as u32, df } }
}
