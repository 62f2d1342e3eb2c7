//! Text predicates used by the content checks

/// Words separated by runs of whitespace. Consecutive separators never
/// produce empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn looks_like_email(text: &str) -> bool {
    !text.is_empty() && text.contains('@')
}

/// `©` anywhere, or the word "copyright" in any case.
pub fn has_copyright_notice(text: &str) -> bool {
    text.contains('©') || text.to_lowercase().contains("copyright")
}
