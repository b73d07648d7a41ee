use crate::evaluate::{Report, TestCase};
use crate::matcher::{FaqIndex, MatchConfig};
use crate::rules::RuleBook;
use crate::tokenizer::Language;
use crate::{Document, FALLBACK_REPLY};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    pub config: MatchConfig,
}

/// Layout of an index snapshot directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Header names of the question and answer columns in dataset CSVs.
#[derive(Debug, Clone)]
pub struct CsvColumns {
    pub question: String,
    pub answer: String,
}

impl Default for CsvColumns {
    fn default() -> Self { Self { question: "Pertanyaan".into(), answer: "Jawaban".into() } }
}

fn column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    match headers.iter().position(|h| h.trim() == name) {
        Some(i) => Ok(i),
        None => bail!("{}: missing column {name:?}", path.display()),
    }
}

fn read_pairs(path: &Path, columns: &CsvColumns) -> Result<Vec<(String, String)>> {
    let file = File::open(path).with_context(|| format!("open dataset {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers = reader.headers()?.clone();
    let q_col = column(&headers, &columns.question, path)?;
    let a_col = column(&headers, &columns.answer, path)?;
    let mut pairs = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: bad record", path.display()))?;
        let question = record.get(q_col).unwrap_or("").to_string();
        let answer = record.get(a_col).unwrap_or("").to_string();
        if question.trim().is_empty() {
            tracing::warn!(path = %path.display(), row = line + 1, "skipping row with empty question");
            continue;
        }
        pairs.push((question, answer));
    }
    Ok(pairs)
}

pub fn load_dataset(path: &Path, columns: &CsvColumns) -> Result<Vec<Document>> {
    let docs: Vec<Document> = read_pairs(path, columns)?.into_iter().map(|(q, a)| Document::new(q, a)).collect();
    tracing::info!(path = %path.display(), num_docs = docs.len(), "loaded dataset");
    Ok(docs)
}

pub fn load_test_cases(path: &Path, columns: &CsvColumns) -> Result<Vec<TestCase>> {
    Ok(read_pairs(path, columns)?.into_iter().map(|(query, expected)| TestCase { query, expected }).collect())
}

/// Column layout of the accuracy report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLayout {
    /// `No, Pertanyaan, Jawaban Target, Jawaban Chatbot, Score, Hasil`; a miss is left blank.
    Semantic,
    /// `No, Pertanyaan, Jawaban Chatbot, Jawaban Diharapkan, Hasil`; a miss shows the fallback reply.
    Rules,
}

pub fn save_report(path: &Path, report: &Report, layout: ReportLayout) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create report {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    match layout {
        ReportLayout::Semantic => writer.write_record(["No", "Pertanyaan", "Jawaban Target", "Jawaban Chatbot", "Score", "Hasil"])?,
        ReportLayout::Rules => writer.write_record(["No", "Pertanyaan", "Jawaban Chatbot", "Jawaban Diharapkan", "Hasil"])?,
    }
    for row in &report.rows {
        let verdict = if row.correct { "TRUE" } else { "FALSE" }.to_string();
        match layout {
            ReportLayout::Semantic => writer.write_record([
                row.no.to_string(),
                row.question.clone(),
                row.expected.clone(),
                row.predicted.clone().unwrap_or_default(),
                format!("{:.4}", row.score),
                verdict,
            ])?,
            ReportLayout::Rules => writer.write_record([
                row.no.to_string(),
                row.question.clone(),
                row.predicted.clone().unwrap_or_else(|| FALLBACK_REPLY.to_string()),
                row.expected.clone(),
                verdict,
            ])?,
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn save_index(paths: &IndexPaths, index: &FaqIndex, config: &MatchConfig) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;

    let meta = MetaFile {
        num_docs: index.len() as u32,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_default(),
        version: INDEX_VERSION,
        config: *config,
    };
    let mut f = File::create(paths.meta())?;
    f.write_all(serde_json::to_string_pretty(&meta)?.as_bytes())?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "index snapshot saved");
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("open {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn load_index(paths: &IndexPaths) -> Result<(FaqIndex, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != INDEX_VERSION {
        bail!("index snapshot version {} unsupported (expected {INDEX_VERSION})", meta.version);
    }
    let mut f = File::open(paths.index()).with_context(|| format!("open {}", paths.index().display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index: FaqIndex = bincode::deserialize(&buf)?;
    Ok((index, meta))
}

/// Open a snapshot directory (with the config it was built with) or, failing that,
/// build an index from a CSV dataset using the default threshold.
pub fn load_source(index_dir: Option<&Path>, dataset: Option<&Path>, columns: &CsvColumns, language: Language) -> Result<(FaqIndex, MatchConfig)> {
    if let Some(dir) = index_dir {
        let (index, meta) = load_index(&IndexPaths::new(dir))?;
        tracing::info!(num_docs = meta.num_docs, created_at = %meta.created_at, threshold = meta.config.threshold, "loaded index snapshot");
        return Ok((index, meta.config));
    }
    match dataset {
        Some(path) => {
            let index = FaqIndex::build(load_dataset(path, columns)?, language);
            Ok((index, MatchConfig { language, ..MatchConfig::default() }))
        }
        None => bail!("either an index snapshot or a dataset is required"),
    }
}

/// A missing file is an empty rule book.
pub fn load_rules(path: &Path) -> Result<RuleBook> {
    if !path.exists() { return Ok(RuleBook::new()); }
    let f = File::open(path)?;
    let rules = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse rules {}", path.display()))?;
    Ok(rules)
}

pub fn save_rules(path: &Path, rules: &RuleBook) -> Result<()> {
    let mut f = File::create(path)?;
    f.write_all(serde_json::to_string_pretty(rules)?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::evaluate;
    use std::fs;
    use tempfile::tempdir;

    fn two_docs() -> Vec<Document> {
        vec![Document::new("cara daftar akun", "Lewat menu."), Document::new("jam buka kantor", "Jam delapan.")]
    }

    const CSV: &str = "Pertanyaan,Jawaban\n\
        bagaimana cara daftar akun,Daftar lewat menu registrasi.\n\
        ,jawaban tanpa pertanyaan\n\
        \"jam buka, hari sabtu\",Sabtu buka setengah hari.\n";

    #[test]
    fn loads_dataset_and_skips_empty_questions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, CSV).unwrap();
        let docs = load_dataset(&path, &CsvColumns::default()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].question, "jam buka, hari sabtu");
        assert_eq!(docs[1].answer, "Sabtu buka setengah hari.");
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "question,answer\na,b\n").unwrap();
        let err = load_dataset(&path, &CsvColumns::default()).unwrap_err();
        assert!(err.to_string().contains("Pertanyaan"));
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("idx"));
        let idx = FaqIndex::build(two_docs(), Language::Indonesian);
        save_index(&paths, &idx, &MatchConfig::default()).unwrap();
        let (loaded, meta) = load_index(&paths).unwrap();
        assert_eq!(meta.num_docs, 2);
        assert_eq!(meta.version, INDEX_VERSION);
        assert_eq!(loaded.documents(), idx.documents());
        assert_eq!(loaded.best_match("daftar akun", 0.25).doc_id, Some(0));
    }

    #[test]
    fn report_has_expected_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hasil_uji.csv");
        let idx = FaqIndex::build(two_docs(), Language::Indonesian);
        let cases = vec![TestCase { query: "daftar akun".into(), expected: "Lewat menu.".into() }];
        save_report(&path, &evaluate(&idx, &cases, 0.25), ReportLayout::Semantic).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("No,Pertanyaan,Jawaban Target,Jawaban Chatbot,Score,Hasil"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,daftar akun,Lewat menu.,Lewat menu.,"), "{row}");
        assert!(row.ends_with(",TRUE"));
    }

    #[test]
    fn snapshot_config_overrides_default_threshold() {
        let dir = tempdir().unwrap();
        let strict = MatchConfig { threshold: 0.99, language: Language::Indonesian };
        save_index(&IndexPaths::new(dir.path()), &FaqIndex::build(two_docs(), Language::Indonesian), &strict).unwrap();

        let (index, config) = load_source(Some(dir.path()), None, &CsvColumns::default(), Language::English).unwrap();
        assert_eq!(config, strict);
        // 0.816 clears the default threshold but not the saved one
        assert_eq!(index.best_match("daftar akun", crate::DEFAULT_THRESHOLD).doc_id, Some(0));
        assert!(index.best_match("daftar akun", config.threshold).document.is_none());
    }

    #[test]
    fn dataset_source_uses_default_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, CSV).unwrap();
        let (index, config) = load_source(None, Some(&path), &CsvColumns::default(), Language::English).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(config.threshold, crate::DEFAULT_THRESHOLD);
        assert_eq!(config.language, Language::English);
        assert!(load_source(None, None, &CsvColumns::default(), Language::English).is_err());
    }

    #[test]
    fn rules_report_shows_fallback_on_miss() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hasil_uji.csv");
        let mut book = RuleBook::new();
        book.add_rule("salam", "halo", "Hai!");
        let cases = vec![
            TestCase { query: "halo".into(), expected: "Hai!".into() },
            TestCase { query: "zzzz".into(), expected: "Hai!".into() },
        ];
        save_report(&path, &evaluate(&book, &cases, 70.0), ReportLayout::Rules).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "No,Pertanyaan,Jawaban Chatbot,Jawaban Diharapkan,Hasil");
        assert_eq!(lines[1], "1,halo,Hai!,Hai!,TRUE");
        assert_eq!(lines[2], format!("2,zzzz,{FALLBACK_REPLY},Hai!,FALSE"));
    }

    #[test]
    fn missing_rules_file_is_empty_book() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        assert!(load_rules(&path).unwrap().is_empty());
        let mut book = RuleBook::new();
        book.add_rule("salam", "halo", "Hai!");
        save_rules(&path, &book).unwrap();
        assert_eq!(load_rules(&path).unwrap(), book);
    }
}
