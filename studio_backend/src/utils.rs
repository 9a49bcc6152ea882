//! Shared helpers and constants.

use chrono::Utc;

pub const APP_NAME: &str = "studio_backend";

pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339()
}

/// Shortens free text for notification snapshots. Cuts on a char boundary and
/// appends an ellipsis when anything was dropped.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut taken: String = text.chars().take(max_chars).collect();
    if taken.len() < text.len() {
        taken.push('…');
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_text_untouched() {
        assert_eq!(excerpt("nice work", 120), "nice work");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let long = "a".repeat(10) + "é";
        assert_eq!(excerpt(&long, 10), format!("{}…", "a".repeat(10)));
    }
}
