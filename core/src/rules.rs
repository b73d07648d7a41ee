use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 70.0;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub response: String,
}

/// Intents in insertion order, each with its pattern/response pairs.
/// Serialized as the plain `{ "intent": [ {pattern, response}, ... ] }` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleBook {
    intents: IndexMap<String, Vec<Rule>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAdded {
    NewIntent,
    ExistingIntent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<'a> {
    pub intent: Option<&'a str>,
    pub response: Option<&'a str>,
    /// 0..=100
    pub score: f64,
}

impl RuleBook {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.intents.values().map(Vec::len).sum() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
    pub fn intents(&self) -> impl Iterator<Item = (&str, &[Rule])> { self.intents.iter().map(|(k, v)| (k.as_str(), v.as_slice())) }

    /// Intent and pattern are stored lowercased; the response as given.
    pub fn add_rule(&mut self, intent: &str, pattern: &str, response: &str) -> RuleAdded {
        let rule = Rule { pattern: pattern.to_lowercase(), response: response.to_string() };
        match self.intents.get_mut(&intent.to_lowercase()) {
            Some(rules) => {
                rules.push(rule);
                RuleAdded::ExistingIntent
            }
            None => {
                self.intents.insert(intent.to_lowercase(), vec![rule]);
                RuleAdded::NewIntent
            }
        }
    }

    /// Best fuzzy match over every pattern; first one wins on equal scores.
    pub fn respond(&self, input: &str, threshold: f64) -> RuleMatch<'_> {
        let input = clean_text(input);
        let mut best = RuleMatch { intent: None, response: None, score: 0.0 };
        for (intent, rules) in &self.intents {
            for rule in rules {
                let score = token_set_ratio(&input, &clean_text(&rule.pattern));
                if score > best.score {
                    best = RuleMatch { intent: Some(intent.as_str()), response: Some(rule.response.as_str()), score };
                }
            }
        }
        tracing::debug!(score = best.score, threshold, "rule match");
        if best.score >= threshold { best } else { RuleMatch { intent: None, response: None, score: best.score } }
    }
}

pub fn clean_text(text: &str) -> String { NON_WORD.replace_all(&text.to_lowercase(), "").into_owned() }

/// Insertions plus deletions needed to turn `a` into `b`.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    // single-row LCS
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    a.len() + b.len() - 2 * row[b.len()]
}

fn normalized_similarity(dist: usize, lensum: usize) -> f64 {
    if lensum == 0 { return 100.0; }
    100.0 * (1.0 - dist as f64 / lensum as f64)
}

/// Token-set similarity in 0..=100: compares the shared tokens against each side's
/// shared+unique tokens, and the two remainders against each other; the best wins.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() { return 0.0; }

    let sect: Vec<&str> = ta.intersection(&tb).copied().collect();
    let diff_ab: Vec<&str> = ta.difference(&tb).copied().collect();
    let diff_ba: Vec<&str> = tb.difference(&ta).copied().collect();
    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) { return 100.0; }

    let ab: Vec<char> = diff_ab.join(" ").chars().collect();
    let ba: Vec<char> = diff_ba.join(" ").chars().collect();
    let sect_len = sect.join(" ").chars().count();
    let sep = usize::from(sect_len > 0);
    let sect_ab_len = sect_len + sep + ab.len();
    let sect_ba_len = sect_len + sep + ba.len();

    let result = normalized_similarity(indel_distance(&ab, &ba), sect_ab_len + sect_ba_len);
    if sect_len == 0 { return result; }

    // sect vs sect+remainder differ only by the separator and the remainder
    let ab_ratio = normalized_similarity(sep + ab.len(), sect_len + sect_ab_len);
    let ba_ratio = normalized_similarity(sep + ba.len(), sect_len + sect_ba_len);
    result.max(ab_ratio).max(ba_ratio)
}
