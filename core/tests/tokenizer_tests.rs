use faq_core::tokenizer::{normalize, normalize_with, Language};

#[test]
fn it_lowercases_and_strips_punctuation() {
    let words = normalize_with("How do I RESET my password?!", Language::English);
    assert_eq!(words, vec!["reset", "password"]);
}

#[test]
fn it_filters_stopwords() {
    let words = normalize("Apakah saya bisa daftar akun di sini?");
    assert!(!words.contains(&"apakah".to_string()));
    assert!(!words.contains(&"saya".to_string()));
    assert!(!words.contains(&"bisa".to_string()));
    assert_eq!(words, vec!["daftar", "akun", "sini"]);
}

#[test]
fn it_keeps_duplicates_in_order() {
    let words = normalize("promo promo besar promo");
    assert_eq!(words, vec!["promo", "promo", "besar", "promo"]);
}

#[test]
fn it_drops_non_ascii_characters() {
    assert_eq!(normalize_with("café crème", Language::English), vec!["caf", "crme"]);
    assert_eq!(normalize("naïve résumé x² ٣٣٣"), vec!["nave", "rsum"]);
}

#[test]
fn renormalizing_changes_nothing() {
    let samples = [
        "Bagaimana cara reset password akun saya??",
        "Jam buka kantor: 08.00-16.00, Senin s/d Jumat!",
        "   ",
        "ok ya dong",
        "E-mail & nomor HP (wajib) untuk verifikasi",
    ];
    for lang in [Language::Indonesian, Language::English] {
        for text in samples {
            let once = normalize_with(text, lang);
            let twice = normalize_with(&once.join(" "), lang);
            assert_eq!(once, twice, "{text:?}");
        }
    }
}
