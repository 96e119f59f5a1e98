//! Inline style writes and computed style reads

use dom::style::is_custom_property;
use dom::CssValue;

use super::{report, Selection};

impl Selection {
    /// Computed value of `property` on the first node
    pub fn css(&self, property: &str) -> Option<String> {
        let node = self.first_node()?;
        Some(self.window.document().computed_style(node, property))
    }

    /// Set an inline style property on every node; an empty value removes it
    ///
    /// Numbers are written without a unit.
    pub fn set_css(&self, property: &str, value: impl Into<CssValue>) -> &Self {
        let value = value.into().to_css_string();
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report(
                "set_css",
                document
                    .arena_mut()
                    .element_mut(node)
                    .map(|element| element.set_style_property(property, &value)),
            );
        }
        self
    }

    /// Set several inline style properties on every node
    pub fn set_styles<K, V>(&self, styles: impl IntoIterator<Item = (K, V)>) -> &Self
    where
        K: AsRef<str>,
        V: Into<CssValue>,
    {
        for (property, value) in styles {
            self.set_css(property.as_ref(), value);
        }
        self
    }

    /// Trimmed computed value of a (custom) property on the first node
    pub fn css_var(&self, name: &str) -> Option<String> {
        self.css(name).map(|value| value.trim().to_string())
    }

    /// Set a custom property on every node; names without `--` are ignored
    pub fn set_css_var(&self, name: &str, value: &str) -> &Self {
        if !is_custom_property(name) {
            tracing::debug!("Ignoring non-custom property '{}'", name);
            return self;
        }
        self.set_css(name, value)
    }

    pub fn set_css_vars<K, V>(&self, vars: impl IntoIterator<Item = (K, V)>) -> &Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in vars {
            self.set_css_var(name.as_ref(), value.as_ref());
        }
        self
    }
}
