use std::cell::RefCell;
use std::rc::Rc;

use flipbook_core::constants::{
    FLASH_MS, INITIAL_CHECK_DELAY_MS, PAGE_CHANGED_CHECK_DELAY_MS, SETTLE_MS,
};
use flipbook_core::{Book, BookSpan, FlipbookConfig, GestureTracker, Intent, intent_for_key};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent, Window};

use crate::render::{dispatch_page_changed, flash, rest_all, show_transition};
use crate::state::State;
use crate::utils::{Listener, after, log, now, set_timeout, warn};
use crate::video::VideoBinding;

/// Find the book in `document` and wire it up. A missing container is not an
/// error: it is logged and nothing is attached.
pub fn attach(
    window: Window,
    document: Document,
    config: &FlipbookConfig,
) -> Result<Option<Rc<RefCell<State>>>, JsValue> {
    let Some(container) = document.get_element_by_id(&config.container_id) else {
        log(&format!(
            "Flipbook container #{} not found; page flipping disabled",
            config.container_id
        ));
        return Ok(None);
    };
    let container: HtmlElement = container.dyn_into()?;
    let list = container.query_selector_all(&config.leaf_selector)?;
    let mut leaves = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(node) = list.item(i)
            && let Ok(el) = node.dyn_into::<HtmlElement>()
        {
            leaves.push(el);
        }
    }
    let book = Book::opened_at(leaves.len(), config.start_page);
    rest_all(&leaves, book.leaves())?;

    let video = match VideoBinding::discover(&document, config) {
        Ok(v) => v,
        Err(e) => {
            warn(&format!("Video setup skipped: {:?}", e));
            None
        }
    };

    let leaf_count = leaves.len();
    let state = Rc::new(RefCell::new(State {
        window,
        document,
        container,
        leaves,
        book,
        gestures: GestureTracker::new(),
        video,
        listeners: Vec::new(),
        attached: true,
    }));
    or_detach(&state, attach_video(&state).and_then(|()| attach_input(&state)))?;
    log(&format!("Flipbook ready with {} leaves", leaf_count));
    Ok(Some(state))
}

/// Remove every listener and observer. Timers already scheduled still fire
/// but leave the page alone.
pub fn detach(state: &Rc<RefCell<State>>) {
    let mut s = state.borrow_mut();
    s.attached = false;
    s.listeners.clear();
    if let Some(video) = s.video.as_mut() {
        video.disconnect();
    }
}

/// Pass `result` through, detaching `state` first when it is an error so a
/// failed setup step leaves no listener or observer behind.
pub(crate) fn or_detach<T>(
    state: &Rc<RefCell<State>>,
    result: Result<T, JsValue>,
) -> Result<T, JsValue> {
    if result.is_err() {
        detach(state);
    }
    result
}

/// Feed one intent to the book. Returns whether it was accepted.
pub fn navigate(state: &Rc<RefCell<State>>, intent: Intent) -> bool {
    let (window, document, settle_at, z_index) = {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        if !s.attached {
            return false;
        }
        let Some(t) = s.book.apply(intent, now(&s.window)) else {
            return false;
        };
        if let Err(e) = show_transition(&s.window, &s.leaves, s.book.leaves(), &t) {
            warn(&format!("Failed to start page turn: {:?}", e));
        }
        let z_index = s.book.flipping_z_index() + 100;
        (s.window.clone(), s.document.clone(), t.settle_at, z_index)
    };
    if let Err(e) = flash(&window, &document, z_index, FLASH_MS) {
        warn(&format!("Flash overlay failed: {:?}", e));
    }
    let st = state.clone();
    if let Err(e) = set_timeout(&window, SETTLE_MS, move || settle(&st, settle_at)) {
        warn(&format!("Could not schedule settle, settling now: {:?}", e));
        settle(state, settle_at);
    }
    true
}

fn settle(state: &Rc<RefCell<State>>, settle_at: f64) {
    let (window, container, page, attached) = {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        if !s.book.advance(settle_at) {
            return;
        }
        if let Err(e) = rest_all(&s.leaves, s.book.leaves()) {
            warn(&format!("Failed to restack leaves: {:?}", e));
        }
        let page = s.book.current();
        if s.attached
            && let Some(video) = s.video.as_mut()
        {
            video.page_shown(page, state);
        }
        (s.window.clone(), s.container.clone(), page, s.attached)
    };
    if !attached {
        return;
    }
    // host listeners may call back into the handle, so no borrow is held here
    if let Err(e) = dispatch_page_changed(&container, page) {
        warn(&format!("pageChanged dispatch failed: {:?}", e));
    }
    let st = state.clone();
    after(&window, PAGE_CHANGED_CHECK_DELAY_MS, move || check_video_page(&st));
}

/// Fallback video visibility check driven by scroll, resize and page turns.
pub fn check_video_page(state: &Rc<RefCell<State>>) {
    let mut guard = state.borrow_mut();
    let s = &mut *guard;
    if !s.attached {
        return;
    }
    if let Some(video) = s.video.as_mut() {
        video.check_video_page(&s.window, state);
    }
}

fn attach_video(state: &Rc<RefCell<State>>) -> Result<(), JsValue> {
    let mut guard = state.borrow_mut();
    let s = &mut *guard;
    let Some(video) = s.video.as_mut() else {
        return Ok(());
    };
    video.observe(state)?;
    video.page_shown(s.book.current(), state);

    let target: &EventTarget = s.window.as_ref();
    for kind in ["scroll", "resize"] {
        let st = state.clone();
        s.listeners
            .push(Listener::new(target, kind, move |_e| check_video_page(&st))?);
    }
    let st = state.clone();
    after(&s.window, INITIAL_CHECK_DELAY_MS, move || check_video_page(&st));
    Ok(())
}

fn attach_input(state: &Rc<RefCell<State>>) -> Result<(), JsValue> {
    let (container, document) = {
        let s = state.borrow();
        (s.container.clone(), s.document.clone())
    };
    let book: &EventTarget = container.as_ref();
    let mut listeners = Vec::new();

    // Touch
    {
        let st = state.clone();
        listeners.push(Listener::with_passive(book, "touchstart", true, move |e| {
            let Some(e) = e.dyn_ref::<TouchEvent>() else {
                return;
            };
            let touches = e.touches();
            let Some(t) = touches.get(0) else {
                return;
            };
            let mut s = st.borrow_mut();
            let at = now(&s.window);
            s.gestures.touch_start(
                t.client_x() as f64,
                t.client_y() as f64,
                at,
                touches.length() as usize,
            );
        })?);
    }
    {
        let st = state.clone();
        listeners.push(Listener::with_passive(book, "touchmove", true, move |e| {
            if let Some(e) = e.dyn_ref::<TouchEvent>() {
                st.borrow_mut()
                    .gestures
                    .touch_move(e.touches().length() as usize);
            }
        })?);
    }
    {
        let st = state.clone();
        listeners.push(Listener::with_passive(book, "touchend", false, move |e| {
            let Some(te) = e.dyn_ref::<TouchEvent>() else {
                return;
            };
            let Some(t) = te.changed_touches().get(0) else {
                return;
            };
            let intent = {
                let mut s = st.borrow_mut();
                let at = now(&s.window);
                s.gestures
                    .touch_end(t.client_x() as f64, t.client_y() as f64, at)
            };
            if let Some(intent) = intent {
                e.prevent_default();
                navigate(&st, intent);
            }
        })?);
    }

    // Mouse
    {
        let st = state.clone();
        listeners.push(Listener::new(book, "mousedown", move |e| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                let mut s = st.borrow_mut();
                let at = now(&s.window);
                s.gestures
                    .mouse_down(e.client_x() as f64, e.client_y() as f64, at);
            }
        })?);
    }
    {
        let st = state.clone();
        listeners.push(Listener::new(book, "mousemove", move |_e| {
            st.borrow_mut().gestures.mouse_move();
        })?);
    }
    {
        let st = state.clone();
        listeners.push(Listener::new(book, "mouseup", move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            let intent = {
                let mut s = st.borrow_mut();
                let at = now(&s.window);
                s.gestures.mouse_up(e.client_x() as f64, at)
            };
            if let Some(intent) = intent {
                navigate(&st, intent);
            }
        })?);
    }
    {
        let st = state.clone();
        listeners.push(Listener::new(book, "click", move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            let intent = {
                let mut s = st.borrow_mut();
                let rect = s.container.get_bounding_client_rect();
                let span = BookSpan {
                    left: rect.left(),
                    width: rect.width(),
                };
                s.gestures.click(e.client_x() as f64, span)
            };
            if let Some(intent) = intent {
                navigate(&st, intent);
            }
        })?);
    }

    // Keyboard
    {
        let st = state.clone();
        let doc: &EventTarget = document.as_ref();
        listeners.push(Listener::new(doc, "keydown", move |e| {
            let Some(ke) = e.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(intent) = intent_for_key(&ke.key()) {
                e.prevent_default();
                navigate(&st, intent);
            }
        })?);
    }

    state.borrow_mut().listeners.extend(listeners);
    Ok(())
}
