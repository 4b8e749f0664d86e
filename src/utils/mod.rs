pub mod circuit_breaker;
pub mod logging;
pub mod retry;

use chrono::{DateTime, Utc};

/// Collapses runs of whitespace so list rows render on one line.
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shortens `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Millisecond timestamp, used as the id of locally created meetings.
pub fn millis_id(now: DateTime<Utc>) -> i64 {
    now.timestamp_millis()
}
