//! Relevance filter for fuzzy external search results.
//!
//! The NLM search endpoints match loosely; this gate keeps short acronyms
//! like "stat" from matching as substrings of unrelated longer words
//! ("Diabetes", "stature").

use regex::Regex;

/// Whether `text` is about the search `term`.
///
/// Terms of 5 characters or fewer must appear as a whole word
/// (case-insensitive word-boundary match); longer terms match on
/// case-insensitive substring containment. Absent text never matches.
pub fn matches(term: &str, text: Option<&str>) -> bool {
    let Some(text) = text else {
        return false;
    };
    if term.chars().count() <= 5 {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
        Regex::new(&pattern).is_ok_and(|re| re.is_match(text))
    } else {
        text.to_lowercase().contains(&term.to_lowercase())
    }
}
