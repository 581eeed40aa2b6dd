// Pure display helpers. Nothing here touches the board or the network.
use chrono::{DateTime, NaiveDate, NaiveDateTime};

// What an unparseable or absent creation date renders as.
pub const DATE_SENTINEL: &str = "N/A";

// Format a server-assigned timestamp for a task card. The API usually sends
// RFC 3339, but the contract only promises "a parseable date", so a couple
// of common plain formats are accepted too. Anything else becomes "N/A".
pub fn format_created_at(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return DATE_SENTINEL.to_string();
    };

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return date.format("%b %e, %Y %H:%M").to_string();
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return date.format("%b %e, %Y %H:%M").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %e, %Y").to_string();
    }

    DATE_SENTINEL.to_string()
}

// Strip control characters from server-supplied text before it reaches the
// terminal. Escape sequences embedded in a task title could otherwise move
// the cursor or recolor the screen.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
