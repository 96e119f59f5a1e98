//! HTML serializer - Convert an arena subtree back to markup
//!
//! This module handles:
//! - `innerHTML` / `outerHTML` for any node
//! - Text and attribute escaping
//! - Void elements (no closing tag) and raw-text elements (no escaping)

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Elements whose text children are emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Serialize the children of a node (`innerHTML`)
pub fn inner_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::new();
    let raw = arena
        .get(node_id)?
        .tag_name()
        .map(|tag| RAW_TEXT_ELEMENTS.contains(&tag))
        .unwrap_or(false);
    for &child in arena.children(node_id) {
        serialize_node(arena, child, raw, &mut output)?;
    }
    Ok(output)
}

/// Serialize a node including itself (`outerHTML`)
pub fn outer_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::new();
    serialize_node(arena, node_id, false, &mut output)?;
    Ok(output)
}

/// Serialize a single node recursively
fn serialize_node(arena: &DomArena, node_id: NodeId, raw: bool, output: &mut String) -> Result<()> {
    let node = arena.get(node_id)?;

    match node.node_type {
        NodeType::Element => {
            output.push('<');
            output.push_str(&node.node_name);
            for (name, value) in node.attributes() {
                output.push(' ');
                output.push_str(name);
                output.push_str("=\"");
                escape_into(value, true, output);
                output.push('"');
            }
            output.push('>');

            if VOID_ELEMENTS.contains(&node.node_name.as_str()) {
                return Ok(());
            }

            let raw_children = RAW_TEXT_ELEMENTS.contains(&node.node_name.as_str());
            for &child_id in &node.children_ids {
                serialize_node(arena, child_id, raw_children, output)?;
            }

            output.push_str("</");
            output.push_str(&node.node_name);
            output.push('>');
        }
        NodeType::Text => {
            if raw {
                output.push_str(&node.node_value);
            } else {
                escape_into(&node.node_value, false, output);
            }
        }
        NodeType::Comment => {
            output.push_str("<!--");
            output.push_str(&node.node_value);
            output.push_str("-->");
        }
        NodeType::Document => {
            for &child_id in &node.children_ids {
                serialize_node(arena, child_id, false, output)?;
            }
        }
    }

    Ok(())
}

fn escape_into(text: &str, attribute: bool, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' if attribute => output.push_str("&quot;"),
            '<' if !attribute => output.push_str("&lt;"),
            '>' if !attribute => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_subtree() {
        let mut arena = DomArena::new();
        let div = arena.create_element("DIV");
        arena.get_mut(div).unwrap().set_attr("title", "a \"b\" & c");
        let text = arena.create_text("1 < 2");
        let br = arena.create_element("br");
        arena.append_child(div, text).unwrap();
        arena.append_child(div, br).unwrap();

        assert_eq!(inner_html(&arena, div).unwrap(), "1 &lt; 2<br>");
        assert_eq!(
            outer_html(&arena, div).unwrap(),
            "<div title=\"a &quot;b&quot; &amp; c\">1 &lt; 2<br></div>"
        );
    }

    #[test]
    fn test_raw_text_and_comments() {
        let mut arena = DomArena::new();
        let script = arena.create_element("script");
        let code = arena.create_text("if (a < b) {}");
        arena.append_child(script, code).unwrap();
        let comment = arena.create_comment(" note ");

        assert_eq!(inner_html(&arena, script).unwrap(), "if (a < b) {}");
        assert_eq!(outer_html(&arena, comment).unwrap(), "<!-- note -->");
    }
}
