//! Immediate show/hide

use super::{report, Selection};

impl Selection {
    /// Set `display` to the configured default (`block`)
    pub fn show(&self) -> &Self {
        let display = self.config().default_display.clone();
        self.show_as(&display)
    }

    /// Set `display` to an explicit value
    pub fn show_as(&self, display: &str) -> &Self {
        self.set_display(display);
        self
    }

    pub fn hide(&self) -> &Self {
        self.set_display("none");
        self
    }

    /// Nodes computing to `display: none` get the default display, all others get `none`
    pub fn toggle_visibility(&self) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            let hidden = document.computed_style(node, "display") == "none";
            let display = if hidden {
                self.config().default_display.as_str()
            } else {
                "none"
            };
            report(
                "toggle_visibility",
                document
                    .arena_mut()
                    .element_mut(node)
                    .map(|element| element.set_style_property("display", display)),
            );
        }
        self
    }

    fn set_display(&self, display: &str) {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report(
                "set_display",
                document
                    .arena_mut()
                    .element_mut(node)
                    .map(|element| element.set_style_property("display", display)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::page;

    #[test]
    fn test_show_hide() {
        let mq = page();
        let items = mq.select(".item");
        items.hide();
        assert_eq!(items.css("display").as_deref(), Some("none"));
        assert_eq!(mq.select("#third").css("display").as_deref(), Some("none"));

        items.show();
        assert_eq!(mq.select("#third").css("display").as_deref(), Some("block"));
        items.show_as("flex");
        assert_eq!(items.css("display").as_deref(), Some("flex"));
    }

    #[test]
    fn test_toggle_without_class_flips_visibility() {
        let mq = page();
        let first = mq.select("#first");
        first.toggle(None);
        assert_eq!(first.css("display").as_deref(), Some("none"));
        first.toggle(None);
        assert_eq!(first.css("display").as_deref(), Some("block"));
        assert!(!first.has_class(""));
    }
}
