use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use faq_core::evaluate::{evaluate, Report, TestCase};
use faq_core::persist::{load_rules, load_source, load_test_cases, save_index, save_report, CsvColumns, IndexPaths, ReportLayout};
use faq_core::rules::DEFAULT_FUZZY_THRESHOLD;
use faq_core::{FaqIndex, Language, MatchConfig, FALLBACK_REPLY};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

mod chat;

use chat::ChatEngine;

#[derive(Parser)]
#[command(name = "faqbot")]
#[command(about = "Answer questions from a CSV FAQ knowledge base", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the knowledge base comes from.
#[derive(Args)]
struct SourceArgs {
    /// CSV dataset with question and answer columns
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Prebuilt index snapshot directory (takes precedence over --dataset)
    #[arg(long)]
    index: Option<PathBuf>,
    #[arg(long, default_value = "Pertanyaan")]
    question_column: String,
    #[arg(long, default_value = "Jawaban")]
    answer_column: String,
    /// Stopword language: indonesian or english
    #[arg(long, default_value_t = Language::Indonesian)]
    language: Language,
}

impl SourceArgs {
    fn columns(&self) -> CsvColumns {
        CsvColumns { question: self.question_column.clone(), answer: self.answer_column.clone() }
    }

    /// The index plus the config it carries: a snapshot's saved config, or defaults.
    fn load(&self) -> Result<(FaqIndex, MatchConfig)> {
        load_source(self.index.as_deref(), self.dataset.as_deref(), &self.columns(), self.language)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Engine {
    Semantic,
    Fuzzy,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index snapshot from a CSV dataset
    Build {
        #[command(flatten)]
        source: SourceArgs,
        /// Output snapshot directory
        #[arg(long)]
        output: PathBuf,
        /// Threshold stored with the snapshot and used by later --index runs
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Answer a single question
    Ask {
        #[command(flatten)]
        source: SourceArgs,
        /// Defaults to the snapshot's threshold, or 0.25
        #[arg(long)]
        threshold: Option<f64>,
        question: String,
    },
    /// Interactive chat loop
    Chat {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t = Engine::Semantic)]
        engine: Engine,
        /// Rule file for the fuzzy engine
        #[arg(long, default_value = "rules.json")]
        rules: PathBuf,
        /// Semantic: the snapshot's threshold, or 0.25. Fuzzy: 70
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Measure accuracy against a labeled test set and write a CSV report
    Evaluate {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t = Engine::Semantic)]
        engine: Engine,
        /// Rule file for the fuzzy engine
        #[arg(long, default_value = "rules.json")]
        rules: PathBuf,
        /// Test CSV; defaults to the dataset itself
        #[arg(long)]
        tests: Option<PathBuf>,
        #[arg(long, default_value = "hasil_uji.csv")]
        output: PathBuf,
        /// Semantic: the snapshot's threshold, or 0.25. Fuzzy: 70
        #[arg(long)]
        threshold: Option<f64>,
    },
}

/// Reply and score for one question.
fn ask(index: &FaqIndex, threshold: f64, question: &str) -> (String, f64) {
    let result = index.best_match(question, threshold);
    (result.answer().unwrap_or(FALLBACK_REPLY).to_string(), result.score)
}

fn run_evaluation(source: &SourceArgs, engine: Engine, rules: &Path, tests: Option<&Path>, threshold: Option<f64>) -> Result<(Report, ReportLayout)> {
    match engine {
        Engine::Semantic => {
            let (index, config) = source.load()?;
            let cases = match tests {
                Some(path) => load_test_cases(path, &source.columns())?,
                None => index
                    .documents()
                    .iter()
                    .map(|d| TestCase { query: d.question.clone(), expected: d.answer.clone() })
                    .collect(),
            };
            Ok((evaluate(&index, &cases, threshold.unwrap_or(config.threshold)), ReportLayout::Semantic))
        }
        Engine::Fuzzy => {
            let book = load_rules(rules)?;
            let cases = match tests.or(source.dataset.as_deref()) {
                Some(path) => load_test_cases(path, &source.columns())?,
                None => bail!("the fuzzy engine needs --tests or --dataset"),
            };
            Ok((evaluate(&book, &cases, threshold.unwrap_or(DEFAULT_FUZZY_THRESHOLD)), ReportLayout::Rules))
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { source, output, threshold } => {
            let (index, config) = source.load()?;
            let config = MatchConfig { threshold: threshold.unwrap_or(config.threshold), language: index.language() };
            save_index(&IndexPaths::new(&output), &index, &config)?;
            println!("Index with {} documents written to {}", index.len(), output.display());
        }
        Commands::Ask { source, threshold, question } => {
            let (index, config) = source.load()?;
            let (reply, score) = ask(&index, threshold.unwrap_or(config.threshold), &question);
            println!("{reply}");
            println!("score: {score:.4}");
        }
        Commands::Chat { source, engine, rules, threshold } => {
            let mut engine = match engine {
                Engine::Semantic => {
                    let (index, config) = source.load()?;
                    ChatEngine::Semantic { index, threshold: threshold.unwrap_or(config.threshold) }
                }
                Engine::Fuzzy => ChatEngine::Fuzzy {
                    rules: load_rules(&rules)?,
                    path: rules,
                    threshold: threshold.unwrap_or(DEFAULT_FUZZY_THRESHOLD),
                },
            };
            chat::run(&mut engine, io::stdin().lock(), io::stdout().lock())?;
        }
        Commands::Evaluate { source, engine, rules, tests, output, threshold } => {
            let (report, layout) = run_evaluation(&source, engine, &rules, tests.as_deref(), threshold)?;
            save_report(&output, &report, layout)?;
            println!("Total pertanyaan : {}", report.total);
            println!("Jawaban benar    : {}", report.correct);
            println!("Akurasi          : {:.2}%", report.accuracy_percent());
            println!("Hasil disimpan di file: {}", output.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faq_core::Document;
    use std::fs;
    use tempfile::tempdir;

    fn source(index: Option<PathBuf>, dataset: Option<PathBuf>) -> SourceArgs {
        SourceArgs {
            dataset,
            index,
            question_column: "Pertanyaan".into(),
            answer_column: "Jawaban".into(),
            language: Language::English,
        }
    }

    fn faqs() -> FaqIndex {
        FaqIndex::build(
            vec![
                Document::new("how do I reset my password", "Use the reset link."),
                Document::new("what are your business hours", "Open 9 to 5."),
            ],
            Language::English,
        )
    }

    #[test]
    fn ask_uses_snapshot_threshold() {
        let dir = tempdir().unwrap();
        let config = MatchConfig { threshold: 0.99, language: Language::English };
        save_index(&IndexPaths::new(dir.path()), &faqs(), &config).unwrap();

        let (index, loaded) = source(Some(dir.path().to_path_buf()), None).load().unwrap();
        // "reset" alone scores about 0.707 against the first question
        assert_eq!(loaded.threshold, 0.99);
        let (reply, score) = ask(&index, loaded.threshold, "reset");
        assert_eq!(reply, FALLBACK_REPLY);
        assert!(score > 0.25 && score < 0.99);

        let (reply, _) = ask(&index, 0.25, "reset");
        assert_eq!(reply, "Use the reset link.");
    }

    #[test]
    fn evaluates_rule_book_from_dataset() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("tests.csv");
        let rules = dir.path().join("rules.json");
        fs::write(&data, "Pertanyaan,Jawaban\nhalo,Hai!\nzzzz,Hai!\n").unwrap();
        fs::write(&rules, r#"{"salam":[{"pattern":"halo","response":"Hai!"}]}"#).unwrap();

        let (report, layout) = run_evaluation(&source(None, Some(data)), Engine::Fuzzy, &rules, None, None).unwrap();
        assert_eq!(layout, ReportLayout::Rules);
        assert_eq!(report.total, 2);
        assert_eq!(report.correct, 1);
        assert_eq!(report.rows[0].score, 100.0);
    }

    #[test]
    fn fuzzy_evaluation_needs_test_cases() {
        let dir = tempdir().unwrap();
        let rules = dir.path().join("rules.json");
        assert!(run_evaluation(&source(None, None), Engine::Fuzzy, &rules, None, None).is_err());
    }
}
