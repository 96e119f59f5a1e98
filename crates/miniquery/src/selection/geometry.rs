//! Box sizes and element scroll offsets

use dom::utils::px;

use super::{report, Selection};

/// A length written to `width`/`height`: pixels or a raw CSS value
#[derive(Debug, Clone, PartialEq)]
pub enum Length {
    Px(f64),
    Raw(String),
}

impl Length {
    fn to_css(&self) -> String {
        match self {
            Length::Px(value) => px(*value),
            Length::Raw(value) => value.clone(),
        }
    }
}

impl From<f64> for Length {
    fn from(value: f64) -> Self {
        Length::Px(value)
    }
}

impl From<i32> for Length {
    fn from(value: i32) -> Self {
        Length::Px(value as f64)
    }
}

impl From<&str> for Length {
    fn from(value: &str) -> Self {
        Length::Raw(value.to_string())
    }
}

impl From<String> for Length {
    fn from(value: String) -> Self {
        Length::Raw(value)
    }
}

impl Selection {
    pub fn scroll_top(&self) -> Option<f64> {
        let node = self.first_node()?;
        Some(self.window.document().scroll_top(node))
    }

    pub fn set_scroll_top(&self, value: f64) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("set_scroll_top", document.set_scroll_top(node, value));
        }
        self
    }

    pub fn scroll_left(&self) -> Option<f64> {
        let node = self.first_node()?;
        Some(self.window.document().scroll_left(node))
    }

    pub fn set_scroll_left(&self, value: f64) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("set_scroll_left", document.set_scroll_left(node, value));
        }
        self
    }

    /// Rendered box height of the first node (`0` when not rendered)
    pub fn height(&self) -> Option<f64> {
        let node = self.first_node()?;
        Some(self.window.document().offset_height(node))
    }

    /// Rendered box width of the first node (`0` when not rendered)
    pub fn width(&self) -> Option<f64> {
        let node = self.first_node()?;
        Some(self.window.document().offset_width(node))
    }

    pub fn set_height(&self, value: impl Into<Length>) -> &Self {
        self.set_css("height", value.into().to_css())
    }

    pub fn set_width(&self, value: impl Into<Length>) -> &Self {
        self.set_css("width", value.into().to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::page;
    use dom::DomRect;

    #[test]
    fn test_box_size_follows_layout() {
        let mq = page();
        let main = mq.select("#main");
        let node = main.get(0).unwrap();
        assert_eq!(main.height(), Some(0.0));

        mq.window()
            .document_mut()
            .set_layout(node, DomRect::new(0.0, 0.0, 300.0, 120.0))
            .unwrap();
        assert_eq!(main.height(), Some(120.0));
        assert_eq!(main.width(), Some(300.0));

        main.hide();
        assert_eq!(main.height(), Some(0.0));
    }

    #[test]
    fn test_set_dimensions() {
        let mq = page();
        let items = mq.select(".item");
        items.set_height(40).set_width("50%");
        assert_eq!(mq.select("#second").css("height").as_deref(), Some("40px"));
        assert_eq!(mq.select("#third").css("width").as_deref(), Some("50%"));
        items.set_height(12.5);
        assert_eq!(items.css("height").as_deref(), Some("12.5px"));
    }

    #[test]
    fn test_scroll_offsets_clamp() {
        let mq = page();
        let main = mq.select("#main");
        let node = main.get(0).unwrap();
        {
            let mut document = mq.window().document_mut();
            document.set_layout(node, DomRect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
            document.set_scroll_size(node, 400.0, 250.0).unwrap();
        }
        main.set_scroll_top(80.0).set_scroll_left(500.0);
        assert_eq!(main.scroll_top(), Some(80.0));
        assert_eq!(main.scroll_left(), Some(300.0));
        main.set_scroll_top(-3.0);
        assert_eq!(main.scroll_top(), Some(0.0));
        assert_eq!(mq.select(".missing").scroll_top(), None);
    }
}
