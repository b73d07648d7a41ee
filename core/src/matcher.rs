use crate::index::{build_statistics, CorpusIndex, DocId, Document, TermVector};
use crate::similarity::cosine_similarity;
use crate::tfidf::vectorize;
use crate::tokenizer::{normalize_with, Language};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_THRESHOLD: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub threshold: f64,
    pub language: Language,
}

impl Default for MatchConfig {
    fn default() -> Self { Self { threshold: DEFAULT_THRESHOLD, language: Language::default() } }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    pub doc_id: Option<DocId>,
    pub document: Option<&'a Document>,
    /// Best similarity seen, reported even when nothing cleared the threshold.
    pub score: f64,
}

impl<'a> MatchResult<'a> {
    fn none(score: f64) -> Self { Self { doc_id: None, document: None, score } }
    pub fn answer(&self) -> Option<&'a str> { self.document.map(|d| d.answer.as_str()) }
    pub fn is_match(&self) -> bool { self.document.is_some() }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Highest-scoring document; strict `>` keeps the earliest one on ties.
fn select_best(query: &TermVector, vectors: &[TermVector]) -> (Option<DocId>, f64) {
    let mut best: Option<DocId> = None;
    let mut best_score = 0.0;
    for (doc_id, v) in vectors.iter().enumerate() {
        let score = cosine_similarity(query, v);
        if score > best_score {
            best_score = score;
            best = Some(doc_id);
        }
    }
    (best, best_score)
}

fn decide<'a>(documents: &'a [Document], best: Option<DocId>, score: f64, threshold: f64) -> MatchResult<'a> {
    match best {
        Some(doc_id) if score >= threshold => MatchResult { doc_id: Some(doc_id), document: documents.get(doc_id), score },
        _ => MatchResult::none(score),
    }
}

/// Match against `documents`, rebuilding the corpus statistics on every call.
/// Prefer [`FaqIndex`] when the corpus is queried repeatedly.
pub fn match_query<'a>(query: &str, documents: &'a [Document], threshold: f64) -> MatchResult<'a> {
    match_query_with(query, documents, threshold, Language::default())
}

pub fn match_query_with<'a>(query: &str, documents: &'a [Document], threshold: f64, language: Language) -> MatchResult<'a> {
    if documents.is_empty() { return MatchResult::none(0.0); }
    let questions: Vec<&str> = documents.iter().map(|d| d.question.as_str()).collect();
    let vectors = vectorize(&build_statistics(&questions, language));
    let q = TermVector::from_tokens(normalize_with(query, language));
    let (best, score) = select_best(&q, &vectors);
    decide(documents, best, score, threshold)
}

/// Documents with their corpus index and TF-IDF vectors computed once.
/// Any mutation of the document set rebuilds the derived data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaqIndex {
    language: Language,
    documents: Vec<Document>,
    index: CorpusIndex,
    vectors: Vec<TermVector>,
}

impl FaqIndex {
    pub fn build(documents: Vec<Document>, language: Language) -> Self {
        let mut idx = Self { language, documents, ..Self::default() };
        idx.rebuild();
        idx
    }

    fn rebuild(&mut self) {
        let questions: Vec<&str> = self.documents.iter().map(|d| d.question.as_str()).collect();
        let stats = build_statistics(&questions, self.language);
        self.vectors = vectorize(&stats);
        self.index = stats.index;
        tracing::debug!(num_docs = self.documents.len(), num_terms = self.index.df.len(), "faq index built");
    }

    /// Append a document and rebuild. Returns its id.
    pub fn push(&mut self, document: Document) -> DocId {
        self.documents.push(document);
        self.rebuild();
        self.documents.len() - 1
    }

    pub fn language(&self) -> Language { self.language }
    pub fn documents(&self) -> &[Document] { &self.documents }
    pub fn document(&self, doc_id: DocId) -> Option<&Document> { self.documents.get(doc_id) }
    pub fn corpus_index(&self) -> &CorpusIndex { &self.index }
    pub fn len(&self) -> usize { self.documents.len() }
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    /// Raw-count vector for a query. Queries are deliberately not TF-IDF weighted.
    pub fn query_vector(&self, query: &str) -> TermVector { TermVector::from_tokens(normalize_with(query, self.language)) }

    pub fn best_match(&self, query: &str, threshold: f64) -> MatchResult<'_> {
        let q = self.query_vector(query);
        let (best, score) = select_best(&q, &self.vectors);
        tracing::debug!(query, ?best, score, threshold, "best match");
        decide(&self.documents, best, score, threshold)
    }

    /// Up to `k` documents with a non-zero score, best first, ties by id.
    pub fn rank(&self, query: &str, k: usize) -> Vec<ScoredDoc> {
        let q = self.query_vector(query);
        let mut scored: Vec<ScoredDoc> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(doc_id, v)| ScoredDoc { doc_id, score: cosine_similarity(&q, v) })
            .filter(|s| s.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then(a.doc_id.cmp(&b.doc_id)));
        scored.truncate(k);
        scored
    }
}
