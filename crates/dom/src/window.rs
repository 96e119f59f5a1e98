//! Window - the single-threaded host around a document
//!
//! Owns the document plus everything a page script reaches through
//! `window`: a virtual clock, animation frames, timers, scroll offsets,
//! location, ready state and focus. Cloning a `Window` clones the handle,
//! not the page.
//!
//! Time only moves when the embedder says so (`advance`, `run_for`), which
//! keeps frame-driven code deterministic under test.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;
use url::Url;

use crate::document::Document;
use crate::error::{DomError, Result};
use crate::events::{Event, Listener};
use crate::scheduler::{FrameCallback, FrameId, FrameScheduler, TimerId, TimerQueue};
use crate::types::{DomRect, NodeId};

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub url: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Frame step used by `run_for` (60 Hz by default)
    pub frame_interval_ms: f64,
    pub ready_state: ReadyState,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            viewport_width: 1280.0,
            viewport_height: 720.0,
            frame_interval_ms: 1000.0 / 60.0,
            ready_state: ReadyState::Complete,
        }
    }
}

/// `window.location` plus what the host observed happen to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub href: String,
    pub reload_count: u32,
    pub last_reload_forced: bool,
    /// Every URL navigated to, oldest first (the initial URL included)
    pub history: Vec<String>,
}

struct WindowInner {
    config: WindowConfig,
    document: RefCell<Document>,
    clock: Cell<f64>,
    frames: RefCell<FrameScheduler>,
    timers: RefCell<TimerQueue>,
    scroll: Cell<(f64, f64)>,
    location: RefCell<Location>,
    ready_state: Cell<ReadyState>,
    active_element: Cell<Option<NodeId>>,
}

/// Cloneable handle to the host window
#[derive(Clone)]
pub struct Window {
    inner: Rc<WindowInner>,
}

impl Window {
    /// Window around an empty document
    pub fn new(config: WindowConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    /// Window around a parsed page
    pub fn from_html(html: &str, config: WindowConfig) -> Result<Self> {
        Ok(Self::with_document(Document::parse(html)?, config))
    }

    pub fn with_document(document: Document, config: WindowConfig) -> Self {
        let location = Location {
            href: config.url.clone(),
            reload_count: 0,
            last_reload_forced: false,
            history: vec![config.url.clone()],
        };
        Self {
            inner: Rc::new(WindowInner {
                ready_state: Cell::new(config.ready_state),
                config,
                document: RefCell::new(document),
                clock: Cell::new(0.0),
                frames: RefCell::new(FrameScheduler::new()),
                timers: RefCell::new(TimerQueue::new()),
                scroll: Cell::new((0.0, 0.0)),
                location: RefCell::new(location),
                active_element: Cell::new(None),
            }),
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.inner.config
    }

    /// Whether two handles refer to the same window
    pub fn ptr_eq(&self, other: &Window) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the document. Do not hold this across event dispatch.
    pub fn document(&self) -> Ref<'_, Document> {
        self.inner.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.inner.document.borrow_mut()
    }

    /// Virtual clock in milliseconds (`performance.now()`)
    pub fn now(&self) -> f64 {
        self.inner.clock.get()
    }

    pub fn inner_width(&self) -> f64 {
        self.inner.config.viewport_width
    }

    pub fn inner_height(&self) -> f64 {
        self.inner.config.viewport_height
    }

    // ---- frames and timers ----

    pub fn request_animation_frame(&self, callback: impl FnOnce(f64) + 'static) -> FrameId {
        self.inner
            .frames
            .borrow_mut()
            .request(FrameCallback::Once(Box::new(callback)))
    }

    /// Run `callback` every frame until it returns `false` or is cancelled
    pub fn start_frame_loop(&self, callback: impl FnMut(f64) -> bool + 'static) -> FrameId {
        self.inner
            .frames
            .borrow_mut()
            .request(FrameCallback::Loop(Box::new(callback)))
    }

    pub fn cancel_animation_frame(&self, id: FrameId) {
        self.inner.frames.borrow_mut().cancel(id);
    }

    /// Callbacks waiting for the next frame
    pub fn pending_frames(&self) -> usize {
        self.inner.frames.borrow().len()
    }

    pub fn set_timeout(&self, callback: impl FnOnce() + 'static, delay_ms: f64) -> TimerId {
        let due = self.now() + delay_ms.max(0.0);
        self.inner
            .timers
            .borrow_mut()
            .schedule(due, Box::new(callback))
    }

    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.inner.timers.borrow_mut().cancel(id)
    }

    /// Run one animation frame at the current time
    pub fn run_frame(&self) {
        let timestamp = self.now();
        let batch = self.inner.frames.borrow_mut().take_pending();
        tracing::trace!("Frame at {:.3}ms: {} callbacks", timestamp, batch.len());

        for (id, callback) in batch {
            if self.inner.frames.borrow().is_cancelled(id) {
                continue;
            }
            match callback {
                FrameCallback::Once(f) => f(timestamp),
                FrameCallback::Loop(mut f) => {
                    if f(timestamp) {
                        self.inner
                            .frames
                            .borrow_mut()
                            .requeue(id, FrameCallback::Loop(f));
                    }
                }
            }
        }

        self.inner.frames.borrow_mut().finish_frame();
    }

    /// Move the clock forward, fire due timers in due order, then run one frame
    pub fn advance(&self, ms: f64) {
        self.advance_to(self.now() + ms.max(0.0));
    }

    /// [`Window::advance`] to an absolute time (never backwards)
    pub fn advance_to(&self, target: f64) {
        let target = target.max(self.now());
        loop {
            let next = self.inner.timers.borrow_mut().pop_due(target);
            let Some((due, callback)) = next else {
                break;
            };
            self.inner.clock.set(due.max(self.now()));
            callback();
        }
        self.inner.clock.set(target);
        self.run_frame();
    }

    /// Advance `ms` in frame-interval steps; the last frame lands exactly on `now + ms`
    pub fn run_for(&self, ms: f64) {
        let base = self.now();
        let end = base + ms.max(0.0);
        let interval = self.inner.config.frame_interval_ms.max(1.0);
        let mut step: u32 = 1;
        while self.now() < end {
            let next = (base + interval * step as f64).min(end);
            self.advance_to(next);
            step += 1;
        }
    }

    // ---- scroll ----

    pub fn scroll_x(&self) -> f64 {
        self.inner.scroll.get().0
    }

    pub fn scroll_y(&self) -> f64 {
        self.inner.scroll.get().1
    }

    /// `window.scrollTo(x, y)`; negative offsets clamp to zero
    pub fn scroll_to(&self, x: f64, y: f64) {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.max(0.0) };
        self.inner.scroll.set((clamp(x), clamp(y)));
    }

    /// `getBoundingClientRect()`: the layout box in viewport coordinates
    pub fn bounding_client_rect(&self, node_id: NodeId) -> DomRect {
        self.client_rects(node_id)
            .into_iter()
            .next()
            .unwrap_or_else(DomRect::zero)
    }

    /// `getClientRects()` in viewport coordinates
    pub fn client_rects(&self, node_id: NodeId) -> Vec<DomRect> {
        let (sx, sy) = self.inner.scroll.get();
        self.document()
            .client_rects(node_id)
            .into_iter()
            .map(|rect| rect.offset(-sx, -sy))
            .collect()
    }

    // ---- location ----

    pub fn location(&self) -> Location {
        self.inner.location.borrow().clone()
    }

    pub fn href(&self) -> String {
        self.inner.location.borrow().href.clone()
    }

    /// `location.reload(force)`
    pub fn reload(&self, force: bool) {
        let mut location = self.inner.location.borrow_mut();
        location.reload_count += 1;
        location.last_reload_forced = force;
        tracing::debug!("Reloading {} (force: {})", location.href, force);
    }

    /// `location.href = url`, resolved against the current location
    pub fn navigate(&self, url: &str) -> Result<()> {
        let resolved = {
            let location = self.inner.location.borrow();
            match Url::parse(url) {
                Ok(absolute) => absolute,
                Err(_) => Url::parse(&location.href)
                    .and_then(|base| base.join(url))
                    .map_err(|source| DomError::InvalidUrl {
                        url: url.to_string(),
                        source,
                    })?,
            }
        };

        let mut location = self.inner.location.borrow_mut();
        let href = resolved.to_string();
        tracing::debug!("Navigated to {}", href);
        location.history.push(href.clone());
        location.href = href;
        Ok(())
    }

    // ---- ready state ----

    pub fn ready_state(&self) -> ReadyState {
        self.inner.ready_state.get()
    }

    /// Move the ready state forward, firing `readystatechange` and, on
    /// leaving `Loading`, `DOMContentLoaded` (and `load` on reaching `Complete`)
    pub fn set_ready_state(&self, state: ReadyState) {
        let previous = self.inner.ready_state.get();
        if state <= previous {
            return;
        }
        self.inner.ready_state.set(state);
        let document_id = self.document().document_id();

        self.dispatch(document_id, "readystatechange", false);
        if previous == ReadyState::Loading {
            self.dispatch(document_id, "DOMContentLoaded", true);
        }
        if state == ReadyState::Complete {
            self.dispatch(document_id, "load", false);
        }
    }

    // ---- events ----

    pub fn add_event_listener(&self, node_id: NodeId, event_type: &str, listener: Listener) {
        tracing::debug!("Listening for '{}' on node {}", event_type, node_id);
        self.document_mut()
            .add_event_listener(node_id, event_type, listener);
    }

    pub fn remove_event_listener(
        &self,
        node_id: NodeId,
        event_type: &str,
        listener: &Listener,
    ) -> bool {
        self.document_mut()
            .remove_event_listener(node_id, event_type, listener)
    }

    /// Dispatch an event. Returns `false` when a listener prevented the default.
    ///
    /// The path and listeners are snapshotted first; no document borrow is
    /// held while listeners run.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        let plan = self
            .document()
            .dispatch_plan(event.target, &event.event_type, event.bubbles);

        for (node_id, listeners) in plan {
            event.set_current_target(node_id);
            for listener in listeners {
                listener(event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        !event.is_default_prevented()
    }

    /// Build and dispatch a plain event
    pub fn dispatch(&self, node_id: NodeId, event_type: &str, bubbles: bool) -> bool {
        self.dispatch_event(&Event::new(event_type, node_id, bubbles))
    }

    // ---- focus ----

    /// `document.activeElement`; `None` stands for the body
    pub fn active_element(&self) -> Option<NodeId> {
        self.inner.active_element.get()
    }

    /// Focus an attached element, blurring the previous one
    pub fn focus(&self, node_id: NodeId) {
        {
            let document = self.document();
            if !document.arena().is_element(node_id) || !document.is_connected(node_id) {
                return;
            }
        }
        let previous = self.inner.active_element.get();
        if previous == Some(node_id) {
            return;
        }
        self.inner.active_element.set(Some(node_id));
        if let Some(previous) = previous {
            self.dispatch(previous, "blur", false);
        }
        self.dispatch(node_id, "focus", false);
    }

    /// Blur the element if it has focus
    pub fn blur(&self, node_id: NodeId) {
        if self.inner.active_element.get() != Some(node_id) {
            return;
        }
        self.inner.active_element.set(None);
        self.dispatch(node_id, "blur", false);
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("href", &self.inner.location.borrow().href)
            .field("now", &self.now())
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loading_window() -> Window {
        Window::new(WindowConfig {
            url: "https://example.com/app/page.html".to_string(),
            ready_state: ReadyState::Loading,
            ..Default::default()
        })
    }

    #[test]
    fn test_frame_loop_until_done() {
        let window = Window::default();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&frames);
        window.start_frame_loop(move |ts| {
            seen.borrow_mut().push(ts);
            seen.borrow().len() < 3
        });

        window.run_for(100.0);
        assert_eq!(frames.borrow().len(), 3);
        assert_eq!(window.pending_frames(), 0);
        assert_eq!(window.now(), 100.0);
    }

    #[test]
    fn test_run_for_lands_on_end() {
        let window = Window::default();
        let last = Rc::new(Cell::new(0.0));
        let seen = Rc::clone(&last);
        window.start_frame_loop(move |ts| {
            seen.set(ts);
            true
        });
        window.run_for(200.0);
        assert_eq!(last.get(), 200.0);
    }

    #[test]
    fn test_cancel_from_inside_frame() {
        let window = Window::default();
        let runs = Rc::new(Cell::new(0));
        let victim = {
            let runs = Rc::clone(&runs);
            window.start_frame_loop(move |_| {
                runs.set(runs.get() + 1);
                true
            })
        };
        let handle = window.clone();
        window.request_animation_frame(move |_| handle.cancel_animation_frame(victim));

        window.advance(16.0);
        window.advance(16.0);
        assert_eq!(runs.get(), 1);
        assert_eq!(window.pending_frames(), 0);
    }

    #[test]
    fn test_timers_before_frame() {
        let window = Window::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        {
            let order = Rc::clone(&order);
            window.set_timeout(move || order.borrow_mut().push("timer"), 10.0);
        }
        {
            let order = Rc::clone(&order);
            window.request_animation_frame(move |_| order.borrow_mut().push("frame"));
        }
        let cancelled = window.set_timeout(|| panic!("cleared timer ran"), 5.0);
        assert!(window.clear_timeout(cancelled));

        window.advance(20.0);
        assert_eq!(*order.borrow(), vec!["timer", "frame"]);
    }

    #[test]
    fn test_viewport_and_client_rects() {
        let window = Window::new(WindowConfig {
            viewport_width: 800.0,
            viewport_height: 600.0,
            ..Default::default()
        });
        assert_eq!((window.inner_width(), window.inner_height()), (800.0, 600.0));

        let body = window.document().body().unwrap();
        window
            .document_mut()
            .set_layout(body, DomRect::new(0.0, 50.0, 800.0, 2000.0))
            .unwrap();
        window.scroll_to(-10.0, 30.0);
        assert_eq!((window.scroll_x(), window.scroll_y()), (0.0, 30.0));
        assert_eq!(window.bounding_client_rect(body).y, 20.0);

        let detached = window.document_mut().create_element("div");
        assert_eq!(window.bounding_client_rect(detached), DomRect::zero());
    }

    #[test]
    fn test_location_navigation_and_reload() {
        let window = loading_window();
        window.navigate("../next?x=1").unwrap();
        assert_eq!(window.href(), "https://example.com/next?x=1");
        window.navigate("https://other.org/").unwrap();
        window.reload(true);

        let location = window.location();
        assert_eq!(location.history.len(), 3);
        assert_eq!(location.history.last(), Some(&location.href));
        assert_eq!(location.href, "https://other.org/");
        assert_eq!(location.reload_count, 1);
        assert!(location.last_reload_forced);

        let blank = Window::default();
        assert!(blank.navigate("relative/path").is_err());
    }

    #[test]
    fn test_dom_content_loaded_fires_once() {
        let window = loading_window();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let document_id = window.document().document_id();
        window.add_event_listener(
            document_id,
            "DOMContentLoaded",
            Rc::new(move |_: &Event| counter.set(counter.get() + 1)),
        );

        window.set_ready_state(ReadyState::Interactive);
        window.set_ready_state(ReadyState::Complete);
        window.set_ready_state(ReadyState::Loading);
        assert_eq!(hits.get(), 1);
        assert_eq!(window.ready_state(), ReadyState::Complete);
    }

    #[test]
    fn test_dispatch_bubbles_and_stops() {
        let window = Window::default();
        let (body, child) = {
            let mut doc = window.document_mut();
            let body = doc.body().unwrap();
            let child = doc.create_element("button");
            doc.arena_mut().append_child(body, child).unwrap();
            (body, child)
        };
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = Rc::clone(&log);
            window.add_event_listener(
                child,
                "click",
                Rc::new(move |e: &Event| log.borrow_mut().push(("child", e.current_target()))),
            );
        }
        {
            let log = Rc::clone(&log);
            window.add_event_listener(
                body,
                "click",
                Rc::new(move |e: &Event| {
                    log.borrow_mut().push(("body", e.current_target()));
                    e.stop_propagation();
                }),
            );
        }
        let document_id = window.document().document_id();
        window.add_event_listener(
            document_id,
            "click",
            Rc::new(|_: &Event| panic!("propagation not stopped")),
        );

        assert!(window.dispatch(child, "click", true));
        assert_eq!(*log.borrow(), vec![("child", child), ("body", body)]);
    }

    #[test]
    fn test_focus_moves_and_blurs() {
        let window = Window::default();
        let (a, b) = {
            let mut doc = window.document_mut();
            let body = doc.body().unwrap();
            let a = doc.create_element("input");
            let b = doc.create_element("input");
            doc.arena_mut().append_child(body, a).unwrap();
            doc.arena_mut().append_child(body, b).unwrap();
            (a, b)
        };
        let blurred = Rc::new(Cell::new(false));
        let flag = Rc::clone(&blurred);
        window.add_event_listener(a, "blur", Rc::new(move |_: &Event| flag.set(true)));

        window.focus(a);
        window.focus(b);
        assert!(blurred.get());
        assert_eq!(window.active_element(), Some(b));
        window.blur(b);
        assert_eq!(window.active_element(), None);
    }

    #[test]
    fn test_bounding_rect_tracks_scroll() {
        let window = Window::default();
        let div = {
            let mut doc = window.document_mut();
            let body = doc.body().unwrap();
            let div = doc.create_element("div");
            doc.arena_mut().append_child(body, div).unwrap();
            doc.set_layout(div, DomRect::new(0.0, 500.0, 100.0, 50.0)).unwrap();
            div
        };
        window.scroll_to(0.0, 200.0);
        assert_eq!(window.bounding_client_rect(div).y, 300.0);
        window.scroll_to(-10.0, 0.0);
        assert_eq!(window.scroll_x(), 0.0);
    }
}
