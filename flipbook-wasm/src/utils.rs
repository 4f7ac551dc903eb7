use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, Window};

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

pub fn warn(s: &str) {
    web_sys::console::warn_1(&JsValue::from_str(s));
}

/// Monotonic milliseconds, falling back to wall-clock time when the
/// performance API is unavailable.
pub fn now(window: &Window) -> f64 {
    window
        .performance()
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Run `f` once after `ms` milliseconds.
pub fn set_timeout(window: &Window, ms: f64, f: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let cb = Closure::once_into_js(f);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms as i32)
}

/// Like `set_timeout`, but a failure to schedule is only logged.
pub fn after(window: &Window, ms: f64, f: impl FnOnce() + 'static) {
    if let Err(e) = set_timeout(window, ms, f) {
        warn(&format!("setTimeout failed: {:?}", e));
    }
}

/// An event listener that unregisters itself when dropped.
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        f: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(f));
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Listener {
            target: target.clone(),
            kind,
            callback,
        })
    }

    /// Register with an explicit `passive` flag, for touch handlers.
    pub fn with_passive(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        f: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(f));
        let opts = web_sys::AddEventListenerOptions::new();
        opts.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &opts,
        )?;
        Ok(Listener {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Simple query string parser used at start-up.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_encoding::percent_decode_str(&s)
        .decode_utf8_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_lookup() {
        assert_eq!(get_query_param("?page=3&x=1", "page"), Some("3".to_string()));
        assert_eq!(get_query_param("?x=1&page=%204", "page"), Some(" 4".to_string()));
        assert_eq!(get_query_param("?x=1", "page"), None);
        assert_eq!(get_query_param("", "page"), None);
    }
}
