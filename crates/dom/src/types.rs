//! Core type definitions for the host document tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Attributes keep insertion order so serialization round-trips

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

use crate::style::InlineStyle;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
}

/// Rectangle with coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Apply offset (document → viewport coordinates)
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Scroll position and scrollable extent of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub top: f64,
    pub left: f64,
    pub height: f64,
    pub width: f64,
}

/// Value of a live node property (`el[name]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    String(String),
    Null,
}

impl PropValue {
    /// JavaScript-style truthiness
    pub fn truthy(&self) -> bool {
        match self {
            PropValue::Bool(b) => *b,
            PropValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PropValue::String(s) => !s.is_empty(),
            PropValue::Null => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::Number(n) => write!(f, "{}", n),
            PropValue::String(s) => f.write_str(s),
            PropValue::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

/// Live form state that diverges from the serialized attributes once touched
#[derive(Debug, Clone, Default)]
pub struct NodeProps {
    /// Dirty value (`el.value = ...`); `None` falls back to the attribute
    pub value: Option<String>,
    /// Dirty checkedness; `None` falls back to the `checked` attribute
    pub checked: Option<bool>,
    /// Dirty selectedness for `<option>`
    pub selected: Option<bool>,
    /// Expando properties with no attribute counterpart
    pub expando: HashMap<String, PropValue>,
}

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Use indices instead of pointers
/// - Small fixed-size fields first (better packing)
#[derive(Debug, Clone)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Lowercase tag name for elements, `#text` / `#comment` / `#document` otherwise
    pub node_name: String,
    pub node_value: String,
    attributes: Vec<(String, String)>,

    /// Inline style, mirrored into the `style` attribute
    style: InlineStyle,
    pub props: NodeProps,

    // Host-provided geometry (document coordinates)
    pub layout: Option<DomRect>,
    pub scroll: ScrollMetrics,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: node_name.into(),
            node_value: String::new(),
            attributes: Vec::new(),
            style: InlineStyle::default(),
            props: NodeProps::default(),
            layout: None,
            scroll: ScrollMetrics::default(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is an element with the given (lowercase) tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name == tag
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// All attributes in insertion order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set attribute, keeping the inline style in sync for `style`
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            self.style = InlineStyle::parse(value);
        }
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            self.style = InlineStyle::default();
        }
        self.attributes.retain(|(key, _)| *key != name);
    }

    /// Inline style declaration (`el.style`)
    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    /// Write one inline style property; an empty value removes it
    pub fn set_style_property(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.style.remove(name);
        } else {
            self.style.set(name, value);
        }
        self.sync_style_attr();
    }

    fn sync_style_attr(&mut self) {
        let css = self.style.to_css();
        if css.is_empty() {
            self.attributes.retain(|(key, _)| key != "style");
            return;
        }
        match self.attributes.iter_mut().find(|(key, _)| key == "style") {
            Some(slot) => slot.1 = css,
            None => self.attributes.push(("style".to_string(), css)),
        }
    }

    /// Copy of this node without tree links (for cloning)
    pub(crate) fn detached_copy(&self, node_id: NodeId) -> Self {
        Self {
            node_id,
            parent_id: None,
            children_ids: SmallVec::new(),
            ..self.clone()
        }
    }
}

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose initial `display` is `block`
pub const BLOCK_ELEMENTS: &[&str] = &[
    "html",
    "body",
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "legend",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "ul",
];

/// Elements whose initial `display` is `none`
pub const HIDDEN_ELEMENTS: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "base", "noscript",
];

/// Properties that inherit from the parent when not specified
pub const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "cursor",
    "direction",
    "font",
    "font-family",
    "font-size",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "line-height",
    "list-style",
    "text-align",
    "text-indent",
    "text-transform",
    "visibility",
    "white-space",
    "word-spacing",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_order_and_case() {
        let mut node = DomNode::new(0, NodeType::Element, "div");
        node.set_attr("ID", "main");
        node.set_attr("class", "a b");
        node.set_attr("id", "other");

        assert_eq!(node.attr("id"), Some("other"));
        assert_eq!(
            node.attributes()
                .iter()
                .map(|(k, _)| k.as_str())
                .collect::<Vec<_>>(),
            vec!["id", "class"]
        );
    }

    #[test]
    fn test_style_attribute_sync() {
        let mut node = DomNode::new(0, NodeType::Element, "div");
        node.set_style_property("backgroundColor", "red");
        assert_eq!(node.attr("style"), Some("background-color: red;"));

        node.set_attr("style", "width: 10px; color: blue");
        assert_eq!(node.style().get("width"), Some("10px"));
        assert_eq!(node.style().get("background-color"), None);

        node.set_style_property("width", "");
        node.set_style_property("color", "");
        assert!(!node.has_attr("style"));
    }

    #[test]
    fn test_prop_value_truthiness() {
        assert!(PropValue::from("x").truthy());
        assert!(!PropValue::from("").truthy());
        assert!(!PropValue::Number(0.0).truthy());
        assert!(!PropValue::Null.truthy());
        assert_eq!(PropValue::from(true).to_string(), "true");
    }
}
