use criterion::{criterion_group, criterion_main, Criterion};
use faq_core::tokenizer::normalize;
use faq_core::{match_query, Document, FaqIndex, Language, DEFAULT_THRESHOLD};

fn corpus() -> Vec<Document> {
    let topics = ["akun", "password", "kantor", "rekening", "kartu", "transfer", "promo", "cabang", "saldo", "tagihan"];
    let verbs = ["cara", "buka", "tutup", "ganti", "cek", "bayar", "daftar", "blokir"];
    let mut docs = Vec::new();
    for t in topics {
        for v in verbs {
            docs.push(Document::new(format!("bagaimana {v} {t} lewat aplikasi"), format!("Untuk {v} {t}, buka menu {t}.")));
        }
    }
    docs
}

fn bench_matcher(c: &mut Criterion) {
    let docs = corpus();
    let idx = FaqIndex::build(docs.clone(), Language::Indonesian);
    let query = "apakah saya bisa blokir kartu lewat aplikasi?";
    c.bench_function("normalize_query", |b| b.iter(|| normalize(query)));
    c.bench_function("match_rebuild", |b| b.iter(|| match_query(query, &docs, DEFAULT_THRESHOLD).score));
    c.bench_function("match_cached", |b| b.iter(|| idx.best_match(query, DEFAULT_THRESHOLD).score));
}

criterion_group!(benches, bench_matcher);
criterion_main!(benches);
