//! The selection factory and page-level helpers

use dom::{Event, ReadyState, Window};
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::QueryConfig;
use crate::selection::{QueryContext, Selection};
use crate::target::Target;

/// Entry point bound to one window
///
/// Every selection made through the same factory (or its clones) shares
/// one animation registry, so animations started from different
/// selections still supersede each other per node and property.
#[derive(Debug, Clone)]
pub struct MiniQuery {
    window: Window,
    context: Rc<QueryContext>,
}

impl MiniQuery {
    pub fn new(window: Window) -> Self {
        Self::with_config(window, QueryConfig::default())
    }

    pub fn with_config(window: Window, config: QueryConfig) -> Self {
        Self {
            window,
            context: Rc::new(QueryContext::new(config)),
        }
    }

    /// Build a selection from a selector, a node, or a list of nodes
    pub fn select(&self, target: impl Into<Target>) -> Selection {
        Selection::resolve(&self.window, &self.context, target.into())
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn config(&self) -> &QueryConfig {
        &self.context.config
    }

    /// Run `callback` once the document has been parsed
    ///
    /// Runs immediately unless the window is still `Loading`; otherwise it
    /// waits for `DOMContentLoaded`.
    pub fn ready(&self, callback: impl FnOnce() + 'static) {
        if self.window.ready_state() != ReadyState::Loading {
            callback();
            return;
        }
        let pending = RefCell::new(Some(callback));
        let document_id = self.window.document().document_id();
        self.window.add_event_listener(
            document_id,
            "DOMContentLoaded",
            Rc::new(move |_: &Event| {
                if let Some(callback) = pending.borrow_mut().take() {
                    callback();
                }
            }),
        );
    }

    /// Reload the page; `force` bypasses the cache
    pub fn reload(&self, force: bool) {
        self.window.reload(force);
    }

    /// Navigate to `url`, resolved against the current location
    pub fn redirect(&self, url: &str) {
        if let Err(e) = self.window.navigate(url) {
            tracing::warn!("Redirect failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::WindowConfig;
    use std::cell::Cell;

    fn loading_window() -> Window {
        Window::from_html(
            "<html><body><p id=\"x\">x</p></body></html>",
            WindowConfig {
                url: "https://example.com/app/index.html".to_string(),
                ready_state: ReadyState::Loading,
                ..WindowConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_ready_runs_now_when_parsed() {
        let mq = MiniQuery::new(Window::default());
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        mq.ready(move || flag.set(true));
        assert!(ran.get());
    }

    #[test]
    fn test_ready_waits_for_content_loaded() {
        let mq = MiniQuery::new(loading_window());
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let handle = mq.clone();
        mq.ready(move || {
            counter.set(counter.get() + 1);
            handle.select("#x").add_class("ready");
        });
        assert_eq!(runs.get(), 0);

        mq.window().set_ready_state(ReadyState::Interactive);
        assert_eq!(runs.get(), 1);
        assert!(mq.select("#x").has_class("ready"));

        mq.window().set_ready_state(ReadyState::Complete);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_reload_and_redirect() {
        let mq = MiniQuery::new(loading_window());
        mq.reload(false);
        mq.reload(true);
        let location = mq.window().location();
        assert_eq!(location.reload_count, 2);
        assert!(location.last_reload_forced);

        mq.redirect("../login?next=1");
        assert_eq!(mq.window().href(), "https://example.com/login?next=1");
        mq.redirect("https://other.example/");
        assert_eq!(mq.window().href(), "https://other.example/");
    }

    #[test]
    fn test_clones_share_animation_registry() {
        let mq = MiniQuery::new(loading_window());
        let other = mq.clone();
        let first = mq.select("#x");
        first.set_css("width", "0px");

        let a = first.animate([("width", "10px")]);
        let b = other.select("#x").animate([("width", "20px")]);
        mq.window().run_for(400.0);
        assert!(!a.is_active() && !b.is_active());
        assert_eq!(first.css("width").as_deref(), Some("20px"));
    }
}
