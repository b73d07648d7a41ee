use crate::index::{CorpusIndex, CorpusStats, TermCounts, TermVector};

/// Unsmoothed `ln(N / df)`. Terms unknown to the index weigh 0.
pub fn idf(index: &CorpusIndex, term: &str) -> f64 {
    let df = index.doc_freq(term);
    if df == 0 { return 0.0; }
    (index.num_docs as f64 / df as f64).ln()
}

/// TF-IDF weights for one document.
pub fn weigh(counts: &TermCounts, index: &CorpusIndex) -> TermVector {
    let total = counts.values().sum::<u32>().max(1) as f64;
    counts
        .iter()
        .map(|(term, &c)| (term.clone(), (c as f64 / total) * idf(index, term)))
        .collect()
}

/// One TF-IDF vector per document, in corpus order.
pub fn vectorize(stats: &CorpusStats) -> Vec<TermVector> {
    stats.term_counts.iter().map(|counts| weigh(counts, &stats.index)).collect()
}
