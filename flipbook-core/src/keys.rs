use crate::book::Intent;

/// Map a `KeyboardEvent.key` value to a navigation intent.
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowRight" | "PageDown" | " " => Some(Intent::Next),
        "ArrowLeft" | "PageUp" => Some(Intent::Prev),
        "Home" => Some(Intent::First),
        "End" => Some(Intent::Last),
        _ => None,
    }
}
