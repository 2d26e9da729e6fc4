use std::sync::OnceLock;

use regex::Regex;

use crate::schemas::questions::MAX_TOPIC_CHARS;

/// Summaries longer than this are cut down before they become a game topic.
pub(crate) const MAX_SUMMARY_WORDS: usize = 10;

fn newlines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n]+").expect("newline pattern"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

fn symbols() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("symbol pattern"))
}

/// Turns typed, OCR'd or extracted text into the prompt topic: newlines become spaces,
/// symbols are dropped, whitespace runs collapse, and the result is trimmed and capped
/// at 250 characters.
pub(crate) fn normalize_topic(raw: &str) -> String {
    let text = newlines().replace_all(raw, " ");
    let text = symbols().replace_all(&text, "");
    let text = whitespace_runs().replace_all(&text, " ");

    let truncated: String = text.trim().chars().take(MAX_TOPIC_CHARS).collect();
    truncated.trim_end().to_string()
}

/// First `MAX_SUMMARY_WORDS` words of `text`, single spaced.
pub(crate) fn clamp_words(text: &str) -> String {
    text.split_whitespace().take(MAX_SUMMARY_WORDS).collect::<Vec<_>>().join(" ")
}
