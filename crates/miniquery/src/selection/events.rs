//! Event registration, synthetic dispatch and focus

use dom::Listener;
use std::rc::Rc;

use super::Selection;

impl Selection {
    /// Register `listener` for `event` on every node
    ///
    /// Keep the `Listener` to pass to [`Selection::off`] later; removal
    /// matches by identity.
    pub fn on(&self, event: &str, listener: &Listener) -> &Self {
        for &node in &self.nodes {
            self.window.add_event_listener(node, event, Rc::clone(listener));
        }
        self
    }

    pub fn off(&self, event: &str, listener: &Listener) -> &Self {
        for &node in &self.nodes {
            self.window.remove_event_listener(node, event, listener);
        }
        self
    }

    /// Dispatch a bubbling event named `event` on every node
    pub fn trigger(&self, event: &str) -> &Self {
        for &node in &self.nodes {
            self.window.dispatch(node, event, true);
        }
        self
    }

    /// Focus the first node
    pub fn focus(&self) -> &Self {
        if let Some(node) = self.first_node() {
            self.window.focus(node);
        }
        self
    }

    /// Blur the first node
    pub fn blur(&self) -> &Self {
        if let Some(node) = self.first_node() {
            self.window.blur(node);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::page;
    use crate::listener;
    use dom::Event;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_on_trigger_off() {
        let mq = page();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let handler = listener(move |e: &Event| log.borrow_mut().push(e.target));

        let items = mq.select("p.item");
        items.on("ping", &handler).trigger("ping");
        assert_eq!(*seen.borrow(), items.nodes().to_vec());

        items.off("ping", &handler).trigger("ping");
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_trigger_bubbles_to_ancestors() {
        let mq = page();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        mq.select("#main")
            .on("custom", &listener(move |_: &Event| *counter.borrow_mut() += 1));

        mq.select(".item").trigger("custom");
        assert_eq!(*hits.borrow(), 3);
    }

    #[test]
    fn test_listener_may_mutate_document() {
        let mq = page();
        let handle = mq.clone();
        mq.select("#first").on(
            "click",
            &listener(move |_: &Event| {
                handle.select("#first").add_class("clicked");
            }),
        );
        mq.select("#first").trigger("click");
        assert!(mq.select("#first").has_class("clicked"));
    }

    #[test]
    fn test_focus_and_blur_first_only() {
        let mq = page();
        let inputs = mq.select("input");
        inputs.focus();
        assert_eq!(mq.window().active_element(), inputs.get(0));

        mq.select("input[name=tag]").blur();
        assert_eq!(mq.window().active_element(), inputs.get(0));
        inputs.blur();
        assert_eq!(mq.window().active_element(), None);
    }
}
