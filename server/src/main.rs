use anyhow::Result;
use axum::Router;
use clap::Parser;
use faq_core::persist::{load_rules, load_source, CsvColumns};
use faq_core::Language;
use faq_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// CSV dataset with question and answer columns
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Prebuilt index snapshot directory
    #[arg(long)]
    index: Option<PathBuf>,
    /// Rule file for the fuzzy engine
    #[arg(long, default_value = "rules.json")]
    rules: PathBuf,
    #[arg(long, default_value = "Pertanyaan")]
    question_column: String,
    #[arg(long, default_value = "Jawaban")]
    answer_column: String,
    #[arg(long, default_value_t = Language::Indonesian)]
    language: Language,
    /// Defaults to the snapshot's threshold, or 0.25
    #[arg(long)]
    threshold: Option<f64>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let columns = CsvColumns { question: args.question_column.clone(), answer: args.answer_column.clone() };
    let (index, match_config) = load_source(args.index.as_deref(), args.dataset.as_deref(), &columns, args.language)?;
    let rules = load_rules(&args.rules)?;
    tracing::info!(num_docs = index.len(), num_rules = rules.len(), "knowledge base ready");

    let config = ServerConfig { threshold: args.threshold.unwrap_or(match_config.threshold), ..ServerConfig::from_env() };
    let app: Router = build_app(index, rules, config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
