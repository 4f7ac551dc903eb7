use flipbook_core::{Book, GestureTracker};
use web_sys::{Document, HtmlElement, Window};

use crate::utils::Listener;
use crate::video::VideoBinding;

/// Everything one attached flipbook owns, shared across its callbacks behind
/// an `Rc<RefCell<_>>`.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub container: HtmlElement,
    /// Leaf elements in document order, parallel to `book.leaves()`.
    pub leaves: Vec<HtmlElement>,
    pub book: Book,
    pub gestures: GestureTracker,
    pub video: Option<VideoBinding>,
    pub listeners: Vec<Listener>,
    pub attached: bool,
}
