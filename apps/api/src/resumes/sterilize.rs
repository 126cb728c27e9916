/// Words dropped from resume text before it is stored as `content_sterilized`.
pub const STOP_WORDS: &[&str] = &["a", "the", "and", "or", "in", "to"];

/// Splits on whitespace, drops stop words (case-insensitively) and joins the
/// rest with single spaces. Retained words keep their case.
pub fn sterilize(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}
