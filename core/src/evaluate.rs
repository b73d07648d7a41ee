use crate::matcher::FaqIndex;
use crate::rules::RuleBook;
use serde::{Deserialize, Serialize};

/// Something that answers a question, with the score behind the answer.
/// The answer is `None` when the score stays below `threshold`.
pub trait Responder {
    fn answer(&self, query: &str, threshold: f64) -> (Option<String>, f64);
}

impl Responder for FaqIndex {
    fn answer(&self, query: &str, threshold: f64) -> (Option<String>, f64) {
        let r = self.best_match(query, threshold);
        (r.answer().map(str::to_string), r.score)
    }
}

/// Scores are on the rule book's 0..=100 scale.
impl Responder for RuleBook {
    fn answer(&self, query: &str, threshold: f64) -> (Option<String>, f64) {
        let m = self.respond(query, threshold);
        (m.response.map(str::to_string), m.score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub query: String,
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// 1-based
    pub no: usize,
    pub question: String,
    pub expected: String,
    pub predicted: Option<String>,
    pub score: f64,
    pub correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub correct: usize,
    pub total: usize,
    /// Fraction in 0..=1; 0 when there were no cases.
    pub accuracy: f64,
}

impl Report {
    pub fn accuracy_percent(&self) -> f64 { self.accuracy * 100.0 }
}

/// Run every case through `responder` and compare predicted answers verbatim.
pub fn evaluate<R: Responder + ?Sized>(responder: &R, cases: &[TestCase], threshold: f64) -> Report {
    let mut rows = Vec::with_capacity(cases.len());
    let mut correct = 0;
    for (i, case) in cases.iter().enumerate() {
        let (predicted, score) = responder.answer(&case.query, threshold);
        let is_correct = predicted.as_deref() == Some(case.expected.as_str());
        if is_correct { correct += 1; }
        rows.push(ReportRow {
            no: i + 1,
            question: case.query.clone(),
            expected: case.expected.clone(),
            predicted,
            score,
            correct: is_correct,
        });
    }
    let total = cases.len();
    let accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };
    tracing::info!(total, correct, accuracy, "evaluation finished");
    Report { rows, correct, total, accuracy }
}
