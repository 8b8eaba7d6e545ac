use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a free-text description to its canonical comparable form:
/// NFKD-decompose, strip combining marks, uppercase, collapse whitespace
/// runs to single spaces and trim the ends.
///
/// Total over any input and independent of the system locale, so the same
/// description always folds to the same string on every platform.
pub fn normalize_description(text: &str) -> String {
    let stripped: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
