//! Document - Main entry point for tree operations
//!
//! Owns the node arena, the stylesheet and the listener registry. This is
//! what selection and mutation code talks to; the window wraps it with a
//! clock, scheduler and location.

use crate::arena::DomArena;
use crate::error::Result;
use crate::events::{Listener, ListenerRegistry};
use crate::parser::HtmlParser;
use crate::selector::SelectorList;
use crate::serializer;
use crate::style::{parse_stylesheet, StyleRule};
use crate::types::*;

/// A document tree plus the state that hangs off it
#[derive(Debug)]
pub struct Document {
    arena: DomArena,
    document_id: NodeId,
    stylesheet: Vec<StyleRule>,
    listeners: ListenerRegistry,
}

impl Document {
    /// Empty document with `<html>`, `<head>` and `<body>`
    pub fn new() -> Self {
        let mut arena = DomArena::new();
        let document_id = arena.create_document();
        let html = arena.create_child_element(document_id, "html");
        arena.create_child_element(html, "head");
        arena.create_child_element(html, "body");

        Self {
            arena,
            document_id,
            stylesheet: Vec::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Parse a full HTML document; `<style>` blocks feed the stylesheet
    pub fn parse(html: &str) -> Result<Self> {
        let mut arena = DomArena::new();
        let document_id = HtmlParser::new().parse_document(&mut arena, html)?;
        let mut document = Self {
            arena,
            document_id,
            stylesheet: Vec::new(),
            listeners: ListenerRegistry::new(),
        };

        let styles: Vec<String> = document
            .arena
            .descendant_elements(document_id)
            .into_iter()
            .filter(|&id| document.arena.get(id).map(|n| n.is_tag("style")).unwrap_or(false))
            .map(|id| document.arena.text_content(id))
            .collect();
        for css in styles {
            document.add_stylesheet(&css);
        }

        Ok(document)
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    pub fn document_id(&self) -> NodeId {
        self.document_id
    }

    /// The `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.arena.element_children(self.document_id).first().copied()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.section("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.section("body")
    }

    fn section(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.arena
            .element_children(html)
            .into_iter()
            .find(|&id| self.arena.get(id).map(|n| n.is_tag(tag)).unwrap_or(false))
    }

    /// Whether the node is attached to this document's tree
    pub fn is_connected(&self, node_id: NodeId) -> bool {
        self.arena.contains(self.document_id, node_id)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.create_element(tag)
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.create_text(text)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.arena.find_by_id(id)
    }

    /// All matching elements in the document, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_from(self.document_id, selector)
    }

    /// Matching descendants of `scope` (the scope itself is never included)
    pub fn query_selector_all_from(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .arena
            .descendant_elements(scope)
            .into_iter()
            .filter(|&id| list.matches(&self.arena, id))
            .collect())
    }

    /// `Element.matches`; non-elements never match
    pub fn matches(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        let list = SelectorList::parse(selector)?;
        Ok(list.matches(&self.arena, node_id))
    }

    /// `Element.closest`: the node itself or its nearest matching ancestor
    pub fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        if list.matches(&self.arena, node_id) {
            return Ok(Some(node_id));
        }
        Ok(self
            .arena
            .ancestors(node_id)
            .into_iter()
            .find(|&id| list.matches(&self.arena, id)))
    }

    /// Parse markup into detached top-level nodes, as children of `context`
    ///
    /// Non-element contexts (the document node, text) parse as `<body>`.
    pub fn parse_fragment(&mut self, context: NodeId, html: &str) -> Result<Vec<NodeId>> {
        let tag = match self.arena.element(context) {
            Ok(node) => node.node_name.clone(),
            Err(_) => "body".to_string(),
        };
        HtmlParser::new().parse_fragment(&mut self.arena, &tag, html)
    }

    pub fn inner_html(&self, node_id: NodeId) -> Result<String> {
        serializer::inner_html(&self.arena, node_id)
    }

    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        serializer::outer_html(&self.arena, node_id)
    }

    /// Replace the children of a node with parsed markup
    pub fn set_inner_html(&mut self, node_id: NodeId, html: &str) -> Result<()> {
        self.arena.get(node_id)?;
        let nodes = self.parse_fragment(node_id, html)?;
        self.arena.remove_children(node_id)?;
        for child in nodes {
            self.arena.append_child(node_id, child)?;
        }
        Ok(())
    }

    /// Append the rules of a stylesheet; later rules win ties
    pub fn add_stylesheet(&mut self, css: &str) {
        let rules = parse_stylesheet(css);
        tracing::debug!("Adding {} style rules", rules.len());
        self.stylesheet.extend(rules);
    }

    pub fn add_style_rule(&mut self, selector: &str, declarations: &str) -> Result<()> {
        self.stylesheet.push(StyleRule::parse(selector, declarations)?);
        Ok(())
    }

    pub fn style_rules(&self) -> &[StyleRule] {
        &self.stylesheet
    }

    pub fn add_event_listener(&mut self, node_id: NodeId, event_type: &str, listener: Listener) {
        self.listeners.add(node_id, event_type, listener);
    }

    pub fn remove_event_listener(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        listener: &Listener,
    ) -> bool {
        self.listeners.remove(node_id, event_type, listener)
    }

    /// Nodes an event visits: the target, then (when bubbling) every
    /// ancestor up to and including the document node
    pub fn propagation_path(&self, target: NodeId, bubbles: bool) -> Vec<NodeId> {
        let mut path = vec![target];
        if bubbles {
            let mut current = self.arena.parent(target);
            while let Some(id) = current {
                path.push(id);
                current = self.arena.parent(id);
            }
        }
        path
    }

    /// Listener snapshot for each node on the path that has any
    pub fn dispatch_plan(
        &self,
        target: NodeId,
        event_type: &str,
        bubbles: bool,
    ) -> Vec<(NodeId, Vec<Listener>)> {
        self.propagation_path(target, bubbles)
            .into_iter()
            .map(|id| (id, self.listeners.listeners_for(id, event_type)))
            .filter(|(_, listeners)| !listeners.is_empty())
            .collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
