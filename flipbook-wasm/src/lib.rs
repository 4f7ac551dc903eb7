use std::cell::RefCell;
use std::rc::Rc;

use flipbook_core::Intent;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

mod config;
mod flipbook;
mod render;
mod state;
mod utils;
mod video;

use crate::state::State;
use crate::utils::warn;

thread_local! {
    static HANDLE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    if document.ready_state() == "loading" {
        let onready = Closure::once_into_js(move || {
            if let Err(e) = boot() {
                warn(&format!("Flipbook setup failed: {:?}", e));
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", onready.unchecked_ref())?;
        return Ok(());
    }
    boot()
}

fn boot() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let config = config::load_config(&window, &document);
    if let Some(state) = flipbook::attach(window, document, &config)? {
        HANDLE.with(|h| h.replace(Some(state)));
    }
    Ok(())
}

/// Script-facing handle to an attached flipbook.
#[wasm_bindgen]
pub struct FlipbookHandle {
    state: Rc<RefCell<State>>,
}

/// The flipbook attached at start-up, if the page had one.
#[wasm_bindgen(js_name = flipbook)]
pub fn attached_flipbook() -> Option<FlipbookHandle> {
    HANDLE.with(|h| {
        h.borrow()
            .as_ref()
            .map(|state| FlipbookHandle { state: state.clone() })
    })
}

#[wasm_bindgen]
impl FlipbookHandle {
    pub fn next(&self) -> bool {
        flipbook::navigate(&self.state, Intent::Next)
    }

    pub fn prev(&self) -> bool {
        flipbook::navigate(&self.state, Intent::Prev)
    }

    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&self, page: usize) -> bool {
        flipbook::navigate(&self.state, Intent::GoTo(page))
    }

    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> usize {
        self.state.borrow().book.current()
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.state.borrow().book.leaf_count()
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.state.borrow().book.is_busy()
    }

    /// Unregister all listeners and observers. The handle stays valid but
    /// every navigation call becomes a no-op.
    pub fn detach(&self) {
        flipbook::detach(&self.state);
        HANDLE.with(|h| {
            let mut h = h.borrow_mut();
            if h.as_ref().is_some_and(|s| Rc::ptr_eq(s, &self.state)) {
                *h = None;
            }
        });
    }
}
