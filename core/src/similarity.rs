use crate::index::TermVector;

/// Cosine of the angle between two sparse vectors; 0 when either has zero magnitude.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small.iter().map(|(t, w)| w * large.get(t)).sum();
    let mag_a = a.magnitude();
    let mag_b = b.magnitude();
    if mag_a == 0.0 || mag_b == 0.0 { return 0.0; }
    (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
}
