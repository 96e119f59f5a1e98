//! HTML5 parser
//!
//! Uses html5ever's RcDom and converts the result into arena nodes.
//! Simpler than implementing a TreeSink against the arena directly.

use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, parse_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::NodeId;

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a full document into an empty arena, returning the document node
    pub fn parse_document(&self, arena: &mut DomArena, html: &str) -> Result<NodeId> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let document_id = arena.create_document();
        for child in dom.document.children.borrow().iter() {
            self.convert_node(child, arena, Some(document_id))?;
        }
        tracing::debug!("Parsed document into {} nodes", arena.len());
        Ok(document_id)
    }

    /// Parse markup as the children of a `context` element
    ///
    /// The returned top-level nodes are detached. Parsing follows the
    /// fragment rules for the context tag, so `<tr>` survives under a
    /// `<tbody>` context and is dropped under `<div>`.
    pub fn parse_fragment(
        &self,
        arena: &mut DomArena,
        context: &str,
        html: &str,
    ) -> Result<Vec<NodeId>> {
        let context_name = QualName::new(None, ns!(html), LocalName::from(context));
        let dom = parse_fragment(
            RcDom::default(),
            Default::default(),
            context_name,
            Vec::new(),
            true,
        )
        .one(html);

        // The tree builder roots a fragment in a synthetic <html> element
        let mut roots = Vec::new();
        for root in dom.document.children.borrow().iter() {
            for child in root.children.borrow().iter() {
                if let Some(id) = self.convert_node(child, arena, None)? {
                    roots.push(id);
                }
            }
        }

        tracing::trace!("Parsed {} fragment into {} top-level nodes", context, roots.len());
        Ok(roots)
    }

    /// Convert an RcDom node (and its subtree) into the arena
    fn convert_node(
        &self,
        handle: &Handle,
        arena: &mut DomArena,
        parent: Option<NodeId>,
    ) -> Result<Option<NodeId>> {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, arena, parent)?;
                }
                return Ok(None);
            }
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {
                return Ok(None);
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() && self.drops_whitespace(arena, parent) {
                    return Ok(None);
                }
                arena.create_text(&text)
            }
            RcNodeData::Comment { contents } => arena.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let id = arena.create_element(&name.local);
                let node = arena.get_mut(id)?;
                for attr in attrs.borrow().iter() {
                    node.set_attr(&attr.name.local, &attr.value);
                }
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, arena, Some(id))?;
                }
                id
            }
        };

        if let Some(parent_id) = parent {
            arena.append_child(parent_id, id)?;
        }
        Ok(Some(id))
    }

    /// Inter-element whitespace directly under document, html and head is noise
    fn drops_whitespace(&self, arena: &DomArena, parent: Option<NodeId>) -> bool {
        match parent {
            None => false,
            Some(id) => arena
                .get(id)
                .map(|n| !n.is_element() || n.is_tag("html") || n.is_tag("head"))
                .unwrap_or(false),
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_structure() {
        let mut arena = DomArena::new();
        let parser = HtmlParser::new();
        let doc = parser
            .parse_document(&mut arena, "<html><head><title>T</title></head><body><p id=x>Hi</p></body></html>")
            .unwrap();

        let html = arena.element_children(doc);
        assert_eq!(html.len(), 1);
        let sections = arena.element_children(html[0]);
        assert_eq!(sections.len(), 2);
        assert!(arena.get(sections[1]).unwrap().is_tag("body"));
        let p = arena.find_by_id("x").unwrap();
        assert_eq!(arena.text_content(p), "Hi");
    }

    #[test]
    fn test_parse_fragment_detached() {
        let mut arena = DomArena::new();
        let parser = HtmlParser::new();
        let roots = parser
            .parse_fragment(&mut arena, "div", "<span class=\"a\">one</span> two <!--c-->")
            .unwrap();

        assert_eq!(roots.len(), 3);
        for &id in &roots {
            assert_eq!(arena.parent(id), None);
        }
        let span = arena.get(roots[0]).unwrap();
        assert_eq!(span.attr("class"), Some("a"));
        assert_eq!(arena.get(roots[1]).unwrap().node_value, " two ");
    }

    #[test]
    fn test_parse_fragment_plain_text() {
        let mut arena = DomArena::new();
        let roots = HtmlParser::new().parse_fragment(&mut arena, "p", "just text").unwrap();
        assert_eq!(roots.len(), 1);
        assert!(arena.get(roots[0]).unwrap().is_text());
    }

    #[test]
    fn test_parse_fragment_uses_context() {
        let mut arena = DomArena::new();
        let parser = HtmlParser::new();

        let rows = parser
            .parse_fragment(&mut arena, "tbody", "<tr><td>1</td></tr>")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(arena.get(rows[0]).unwrap().is_tag("tr"));
        let cells = arena.element_children(rows[0]);
        assert_eq!(cells.len(), 1);
        assert!(arena.get(cells[0]).unwrap().is_tag("td"));

        let loose = parser
            .parse_fragment(&mut arena, "div", "<tr><td>1</td></tr>")
            .unwrap();
        assert_eq!(loose.len(), 1);
        assert!(arena.get(loose[0]).unwrap().is_text());
    }

    #[test]
    fn test_parse_fragment_keeps_style_blocks() {
        let mut arena = DomArena::new();
        let roots = HtmlParser::new()
            .parse_fragment(&mut arena, "body", "<style>p{}</style><p>x</p>")
            .unwrap();
        assert_eq!(roots.len(), 2);
        assert!(arena.get(roots[0]).unwrap().is_tag("style"));
        assert!(arena.get(roots[1]).unwrap().is_tag("p"));
    }
}
