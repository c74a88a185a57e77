use chrono::NaiveDate;

/// Report name for one run: `{prefix}-YYYY-MM-DD.md`.
pub fn dated_report_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.md", sanitize_name(prefix), date.format("%Y-%m-%d"))
}

/// File name for a saved page source, derived from a URL or label.
pub fn page_dump_name(label: &str) -> String {
    let label = label
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    format!("{}.html", sanitize_name(label))
}

/// Filesystem-safe name: forbidden characters become `_`, runs of `_`
/// collapse, at most 80 bytes, reserved device names suffixed.
pub fn sanitize_name(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let mut end = compacted.len().min(80);
    while !compacted.is_char_boundary(end) {
        end -= 1;
    }
    compacted.truncate(end);
    if is_reserved_windows_name(&compacted) {
        compacted.push('_');
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
