use anyhow::Result;
use faq_core::persist::save_rules;
use faq_core::rules::{RuleAdded, RuleBook};
use faq_core::{Document, FaqIndex, FALLBACK_REPLY};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Answering backend for the interactive loop.
pub enum ChatEngine {
    Semantic { index: FaqIndex, threshold: f64 },
    /// Rules are written back to `path` after every addition.
    Fuzzy { rules: RuleBook, path: PathBuf, threshold: f64 },
}

impl ChatEngine {
    pub fn reply(&self, input: &str) -> (String, f64) {
        match self {
            ChatEngine::Semantic { index, threshold } => {
                let r = index.best_match(input, *threshold);
                (r.answer().unwrap_or(FALLBACK_REPLY).to_string(), r.score)
            }
            ChatEngine::Fuzzy { rules, threshold, .. } => {
                let m = rules.respond(input, *threshold);
                (m.response.unwrap_or(FALLBACK_REPLY).to_string(), m.score)
            }
        }
    }
}

fn is_exit(cmd: &str) -> bool { matches!(cmd, "keluar" | "quit" | "exit") }
fn is_add(cmd: &str) -> bool { matches!(cmd, "tambah" | "add") }

/// Prompt and read one line; `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 { return Ok(None); }
    Ok(Some(line.trim().to_string()))
}

fn add_entry<R: BufRead, W: Write>(engine: &mut ChatEngine, input: &mut R, out: &mut W) -> Result<()> {
    match engine {
        ChatEngine::Semantic { index, .. } => {
            let Some(question) = prompt(input, out, "Pertanyaan: ")? else { return Ok(()) };
            if question.is_empty() {
                writeln!(out, "Pertanyaan tidak boleh kosong")?;
                return Ok(());
            }
            let Some(answer) = prompt(input, out, "Jawaban: ")? else { return Ok(()) };
            let doc_id = index.push(Document::new(question, answer));
            writeln!(out, "FAQ #{doc_id} ditambahkan")?;
        }
        ChatEngine::Fuzzy { rules, path, .. } => {
            let Some(intent) = prompt(input, out, "Nama intent: ")? else { return Ok(()) };
            let Some(pattern) = prompt(input, out, "Pertanyaan: ")? else { return Ok(()) };
            let Some(response) = prompt(input, out, "Jawaban chatbot: ")? else { return Ok(()) };
            match rules.add_rule(&intent, &pattern, &response) {
                RuleAdded::ExistingIntent => writeln!(out, "Pattern & response ditambahkan ke intent lama")?,
                RuleAdded::NewIntent => writeln!(out, "Intent baru ditambahkan")?,
            }
            save_rules(path, rules)?;
        }
    }
    Ok(())
}

/// Read questions until an exit command or end of input.
pub fn run<R: BufRead, W: Write>(engine: &mut ChatEngine, mut input: R, mut out: W) -> Result<()> {
    writeln!(out, "Chatbot aktif! Ketik 'tambah' untuk menambah jawaban, 'keluar' untuk keluar.")?;
    loop {
        let Some(line) = prompt(&mut input, &mut out, "Kamu: ")? else { break };
        let cmd = line.to_lowercase();
        if is_exit(&cmd) {
            writeln!(out, "Bot: Sampai jumpa")?;
            break;
        }
        if is_add(&cmd) {
            add_entry(engine, &mut input, &mut out)?;
            continue;
        }
        if line.is_empty() { continue; }
        let (reply, score) = engine.reply(&line);
        tracing::debug!(score, "replied");
        writeln!(out, "Bot: {reply}")?;
    }
    Ok(())
}
