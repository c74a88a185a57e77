use scraper::Html;

use crate::page::normalize_text;

pub const TRUNCATED_MARKER: &str = "...";
pub const MAX_SUMMARY_CHARS: usize = 280;

/// Text content of an HTML fragment, entities decoded and whitespace collapsed.
/// Plain text passes through unchanged apart from whitespace.
pub fn plain_text(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return normalize_text(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    let parts: Vec<&str> = parsed.root_element().text().collect();
    normalize_text(&parts.join(" "))
}

/// Cuts `text` to at most `max_chars` characters plus the marker, on a word
/// boundary. A single word longer than the limit is hard-cut.
pub fn truncate_on_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..cut];
    let at_word_end = text[cut..].starts_with(char::is_whitespace);
    let head = match head.rfind(char::is_whitespace) {
        _ if at_word_end => head,
        Some(space) if space > 0 => &head[..space],
        _ => head,
    };
    format!("{}{TRUNCATED_MARKER}", head.trim_end())
}

/// Plain-text summary for digest bullets.
pub fn plain_summary(raw: &str, max_chars: usize) -> String {
    truncate_on_word(&plain_text(raw), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_stripped_and_entities_decoded() {
        assert_eq!(
            plain_text("<p>Gemini&nbsp;2 <b>is</b>\n\n here &amp; now</p>"),
            "Gemini 2 is here & now"
        );
        assert_eq!(plain_text("  already   plain "), "already plain");
    }

    #[test]
    fn truncation_respects_word_boundary() {
        let summary = truncate_on_word("alpha beta gamma delta", 13);
        assert_eq!(summary, "alpha beta...");
        assert_eq!(truncate_on_word("short", 13), "short");
        assert_eq!(truncate_on_word("alpha beta gamma", 10), "alpha beta...");
    }

    #[test]
    fn single_long_word_is_hard_cut() {
        assert_eq!(truncate_on_word("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundary() {
        let summary = truncate_on_word("привет мир как дела", 9);
        assert_eq!(summary, "привет...");
    }
}
