use flipbook_core::{Leaf, Transition};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Document, HtmlElement, Window};

use crate::utils::{after, warn};

/// Event dispatched on the container once a page turn has settled.
pub const PAGE_CHANGED_EVENT: &str = "pageChanged";
/// Class carried by the feedback overlay while it is on screen.
pub const FLASH_CLASS: &str = "flipbook-flash";

pub fn apply_leaf(el: &HtmlElement, leaf: &Leaf) -> Result<(), JsValue> {
    let style = el.style();
    style.set_property("z-index", &leaf.z_index.to_string())?;
    style.set_property("transform", leaf.rotation.css())?;
    let classes = el.class_list();
    classes.toggle_with_force("turned", leaf.turned)?;
    classes.toggle_with_force("flipping", leaf.flipping)?;
    Ok(())
}

/// Write every leaf's resting state to the DOM.
pub fn rest_all(elements: &[HtmlElement], leaves: &[Leaf]) -> Result<(), JsValue> {
    for (el, leaf) in elements.iter().zip(leaves) {
        apply_leaf(el, leaf)?;
    }
    Ok(())
}

/// Reflect a freshly accepted transition. The turning leaf is raised and
/// tagged first and rotated on the next frame so the CSS transition runs.
pub fn show_transition(
    window: &Window,
    elements: &[HtmlElement],
    leaves: &[Leaf],
    transition: &Transition,
) -> Result<(), JsValue> {
    let Some(idx) = transition.flipping_leaf() else {
        return rest_all(elements, leaves);
    };
    let (Some(el), Some(leaf)) = (elements.get(idx), leaves.get(idx)) else {
        return Ok(());
    };
    el.style()
        .set_property("z-index", &leaf.z_index.to_string())?;
    el.class_list().add_1("flipping")?;
    let el = el.clone();
    let transform = leaf.rotation.css();
    let frame = Closure::once_into_js(move |_ts: f64| {
        if let Err(e) = el.style().set_property("transform", transform) {
            warn(&format!("Failed to rotate leaf: {:?}", e));
        }
    });
    window.request_animation_frame(frame.unchecked_ref())?;
    Ok(())
}

/// Brief full-viewport flash as feedback for a page turn, stacked at
/// `z_index`.
pub fn flash(
    window: &Window,
    document: &Document,
    z_index: i32,
    duration_ms: f64,
) -> Result<(), JsValue> {
    let body = document.body().ok_or("no body")?;
    let overlay: HtmlElement = document.create_element("div")?.dyn_into()?;
    overlay.set_class_name(FLASH_CLASS);
    overlay.style().set_css_text(&format!(
        "position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
         background: rgba(255,255,255,0.1); pointer-events: none; z-index: {}; \
         opacity: 0; animation: flashEffect {}s ease-out;",
        z_index,
        duration_ms / 1000.0
    ));
    body.append_child(&overlay)?;
    after(window, duration_ms, move || overlay.remove());
    Ok(())
}

pub fn dispatch_page_changed(container: &HtmlElement, page: usize) -> Result<(), JsValue> {
    let detail = js_sys::Object::new();
    js_sys::Reflect::set(&detail, &"page".into(), &JsValue::from_f64(page as f64))?;
    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_detail(&detail);
    let event = CustomEvent::new_with_event_init_dict(PAGE_CHANGED_EVENT, &init)?;
    container.dispatch_event(&event)?;
    Ok(())
}
