use std::cell::RefCell;
use std::rc::Rc;

use flipbook_core::{
    FlipbookConfig, Observation, PageRect, VideoCommand, VideoController, VideoPageSet, Viewport,
};
use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlVideoElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Node, Window,
};

use crate::state::State;
use crate::utils::{log, warn};

/// Attribute stamped on each page so observer entries map back to ordinals.
const PAGE_ATTR: &str = "data-flipbook-page";

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// The video element together with the pages it lives on and the observer
/// watching them.
pub struct VideoBinding {
    pub element: HtmlVideoElement,
    pub pages: Vec<Element>,
    pub controller: VideoController,
    observer: Option<(IntersectionObserver, ObserverCallback)>,
}

impl VideoBinding {
    /// Find the video and its pages. Returns `None` when the page has no video.
    pub fn discover(document: &Document, config: &FlipbookConfig) -> Result<Option<Self>, JsValue> {
        let Some(el) = document.get_element_by_id(&config.video_id) else {
            return Ok(None);
        };
        let element: HtmlVideoElement = el.dyn_into()?;
        let video_node: &Node = element.as_ref();
        let list = document.query_selector_all(&config.page_selector)?;
        let mut pages = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            if let Some(node) = list.item(i)
                && let Ok(page) = node.dyn_into::<Element>()
            {
                page.set_attribute(PAGE_ATTR, &pages.len().to_string())?;
                pages.push(page);
            }
        }
        let set = match config.video_page_set() {
            Some(set) => set,
            None => VideoPageSet::new(
                pages
                    .iter()
                    .enumerate()
                    .filter(|(_, page)| page.contains(Some(video_node)))
                    .map(|(i, _)| i),
            ),
        };
        if set.is_empty() {
            log("Video element is not on any page; it will stay paused");
        }
        Ok(Some(VideoBinding {
            element,
            pages,
            controller: VideoController::new(set, config.visibility_threshold),
            observer: None,
        }))
    }

    /// Start observing every page. Entries are fed to the controller as one
    /// batch per callback.
    pub fn observe(&mut self, state: &Rc<RefCell<State>>) -> Result<(), JsValue> {
        let st = state.clone();
        let callback: ObserverCallback = Closure::wrap(Box::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let observations: Vec<Observation> = entries
                    .iter()
                    .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        let page = entry.target().get_attribute(PAGE_ATTR)?.parse().ok()?;
                        Some(Observation {
                            page,
                            is_intersecting: entry.is_intersecting(),
                            ratio: entry.intersection_ratio(),
                        })
                    })
                    .collect();
                let mut s = st.borrow_mut();
                if let Some(video) = s.video.as_mut() {
                    let cmd = video.controller.on_visibility_changed(&observations);
                    video.run(cmd, &st);
                }
            },
        ));
        let init = IntersectionObserverInit::new();
        let thresholds = Array::of3(&0.0.into(), &0.5.into(), &1.0.into());
        init.set_threshold(&thresholds);
        init.set_root_margin("0px");
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for page in &self.pages {
            observer.observe(page);
        }
        self.observer = Some((observer, callback));
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some((observer, _callback)) = self.observer.take() {
            observer.disconnect();
        }
    }

    /// The page the book shows after a turn settled.
    pub fn page_shown(&mut self, page: usize, state: &Rc<RefCell<State>>) {
        let cmd = self.controller.on_page_shown(page);
        self.run(cmd, state);
    }

    /// Fallback visibility check from bounding boxes, independent of the
    /// observer.
    pub fn check_video_page(&mut self, window: &Window, state: &Rc<RefCell<State>>) {
        let viewport = Viewport {
            width: window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            height: window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
        };
        let rects: Vec<(usize, PageRect)> = self
            .controller
            .pages()
            .iter()
            .filter_map(|i| {
                let r = self.pages.get(i)?.get_bounding_client_rect();
                Some((
                    i,
                    PageRect {
                        top: r.top(),
                        left: r.left(),
                        bottom: r.bottom(),
                        right: r.right(),
                    },
                ))
            })
            .collect();
        let cmd = self.controller.check_video_page(&rects, viewport);
        self.run(cmd, state);
    }

    /// Apply a controller decision to the media element. A rejected `play()`
    /// is logged and reported back, never retried here.
    pub fn run(&mut self, cmd: Option<VideoCommand>, state: &Rc<RefCell<State>>) {
        match cmd {
            None => {}
            Some(VideoCommand::Pause) => {
                if let Err(e) = self.element.pause() {
                    warn(&format!("Video pause failed: {:?}", e));
                }
            }
            Some(VideoCommand::Play { rewind, ticket }) => {
                if rewind {
                    self.element.set_current_time(0.0);
                }
                match self.element.play() {
                    Ok(promise) => {
                        let st = state.clone();
                        wasm_bindgen_futures::spawn_local(async move {
                            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                                warn(&format!("Video autoplay failed: {:?}", e));
                                if let Some(video) = st.borrow_mut().video.as_mut() {
                                    video.controller.on_play_rejected(ticket);
                                }
                            }
                        });
                    }
                    Err(e) => {
                        warn(&format!("Video autoplay failed: {:?}", e));
                        self.controller.on_play_rejected(ticket);
                    }
                }
            }
        }
    }
}
