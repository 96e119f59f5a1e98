//! Text, markup, value, attribute, property and dataset accessors

use dom::PropValue;

use super::{report, Selection};

impl Selection {
    /// `textContent` of the first node
    pub fn text(&self) -> Option<String> {
        let node = self.first_node()?;
        Some(self.window.document().arena().text_content(node))
    }

    /// Replace the content of every node with a single text node
    pub fn set_text(&self, text: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("set_text", document.arena_mut().set_text_content(node, text));
        }
        self
    }

    /// `innerHTML` of the first node
    pub fn html(&self) -> Option<String> {
        let node = self.first_node()?;
        self.window.document().inner_html(node).ok()
    }

    /// Replace the children of every node with parsed markup
    pub fn set_html(&self, html: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("set_html", document.set_inner_html(node, html));
        }
        self
    }

    /// Form value of the first node (`None` for elements without a value)
    pub fn val(&self) -> Option<String> {
        let node = self.first_node()?;
        self.window.document().value(node)
    }

    pub fn set_val(&self, value: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("set_val", document.set_value(node, value));
        }
        self
    }

    /// Serialized attribute of the first node
    pub fn attr(&self, name: &str) -> Option<String> {
        let node = self.first_node()?;
        let document = self.window.document();
        let value = document.arena().get(node).ok()?.attr(name)?.to_string();
        Some(value)
    }

    pub fn set_attr(&self, name: &str, value: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report(
                "set_attr",
                document
                    .arena_mut()
                    .element_mut(node)
                    .map(|element| element.set_attr(name, value)),
            );
        }
        self
    }

    pub fn remove_attr(&self, name: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            if let Ok(element) = document.arena_mut().element_mut(node) {
                element.remove_attr(name);
            }
        }
        self
    }

    /// Remove the attribute where present, add it empty where absent
    pub fn toggle_attr(&self, name: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            if let Ok(element) = document.arena_mut().element_mut(node) {
                if element.has_attr(name) {
                    element.remove_attr(name);
                } else {
                    element.set_attr(name, "");
                }
            }
        }
        self
    }

    /// Whether any node carries the attribute
    pub fn has_attr(&self, name: &str) -> bool {
        let document = self.window.document();
        self.nodes.iter().any(|&node| {
            document
                .arena()
                .get(node)
                .map(|n| n.has_attr(name))
                .unwrap_or(false)
        })
    }

    /// Live property of the first node
    pub fn prop(&self, name: &str) -> Option<PropValue> {
        let node = self.first_node()?;
        self.window.document().property(node, name)
    }

    pub fn set_prop(&self, name: &str, value: impl Into<PropValue>) -> &Self {
        let value = value.into();
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("set_prop", document.set_property(node, name, value.clone()));
        }
        self
    }

    /// Dataset entry of the first node (`key` in camelCase, no `data-` prefix)
    pub fn data(&self, key: &str) -> Option<String> {
        let node = self.first_node()?;
        self.window.document().dataset(node, key)
    }

    pub fn set_data(&self, key: &str, value: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("set_data", document.set_dataset(node, key, value));
        }
        self
    }
}
