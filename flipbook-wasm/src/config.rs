use flipbook_core::FlipbookConfig;
use web_sys::{Document, Window};

use crate::utils::{get_query_param, log, warn};

/// Id of the optional `<script type="application/json">` block holding page
/// settings.
pub const CONFIG_ELEMENT_ID: &str = "flipbook-config";

/// Defaults, then the inline JSON block, then `?page=`.
pub fn load_config(window: &Window, document: &Document) -> FlipbookConfig {
    let mut config = match document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    {
        Some(text) => match FlipbookConfig::from_json(&text) {
            Ok(c) => c,
            Err(e) => {
                warn(&format!("{e}; falling back to defaults"));
                FlipbookConfig::default()
            }
        },
        None => FlipbookConfig::default(),
    };
    if let Ok(search) = window.location().search()
        && let Some(p) = get_query_param(&search, "page")
    {
        config.apply_page_param(&p);
        log(&format!("Start page from query: {}", config.start_page));
    }
    config
}
