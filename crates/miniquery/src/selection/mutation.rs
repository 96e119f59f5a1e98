//! Insertion, removal, cloning and wrapping

use dom::{Document, NodeId};

use super::{report, Selection};

/// Something to insert: markup to parse, or an existing element to move
#[derive(Debug, Clone)]
pub enum Content {
    Html(String),
    Node(NodeId),
}

impl From<&str> for Content {
    fn from(html: &str) -> Self {
        Content::Html(html.to_string())
    }
}

impl From<String> for Content {
    fn from(html: String) -> Self {
        Content::Html(html)
    }
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Content::Node(node)
    }
}

/// Nodes to insert into `target`: a fresh parse in the target's context,
/// or the moved element
fn materialize(document: &mut Document, target: NodeId, content: &Content) -> Vec<NodeId> {
    match content {
        Content::Html(html) => match document.parse_fragment(target, html) {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!("Could not parse inserted markup: {}", e);
                Vec::new()
            }
        },
        Content::Node(node) if document.arena().is_element(*node) => vec![*node],
        Content::Node(node) => {
            tracing::debug!("Ignoring non-element content node {}", node);
            Vec::new()
        }
    }
}

impl Selection {
    /// Insert content as the last children of every node
    ///
    /// Markup is parsed once per node. An element handle is moved, so with
    /// several nodes it ends up in the last one.
    pub fn append(&self, content: impl Into<Content>) -> &Self {
        let content = content.into();
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            if !document.arena().is_element(node) {
                continue;
            }
            for child in materialize(&mut document, node, &content) {
                report("append", document.arena_mut().append_child(node, child));
            }
        }
        self
    }

    /// Insert content before the first child of every node
    pub fn prepend(&self, content: impl Into<Content>) -> &Self {
        let content = content.into();
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            if !document.arena().is_element(node) {
                continue;
            }
            let first_child = document.arena().children(node).first().copied();
            for child in materialize(&mut document, node, &content) {
                report(
                    "prepend",
                    document.arena_mut().insert_before(node, child, first_child),
                );
            }
        }
        self
    }

    /// Remove every node from its parent
    pub fn remove(&self) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("remove", document.arena_mut().remove_from_parent(node));
        }
        tracing::debug!("Removed {} nodes", self.nodes.len());
        self
    }

    /// Remove all children of every node
    pub fn empty(&self) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            report("empty", document.arena_mut().remove_children(node));
        }
        self
    }

    /// Remove nodes from their parents, keeping the handles for reinsertion
    ///
    /// Only nodes that actually had a parent are in the returned selection.
    pub fn detach(&self) -> Selection {
        let mut document = self.window.document_mut();
        let detached = self
            .nodes
            .iter()
            .copied()
            .filter(|&node| document.arena_mut().remove_from_parent(node).unwrap_or(false))
            .collect();
        self.derive(detached)
    }

    /// Deep copies of every node, detached
    pub fn deep_clone(&self) -> Selection {
        let mut document = self.window.document_mut();
        let clones = self
            .nodes
            .iter()
            .filter_map(|&node| match document.arena_mut().deep_clone(node) {
                Ok(copy) => Some(copy),
                Err(e) => {
                    tracing::warn!("deep_clone skipped: {}", e);
                    None
                }
            })
            .collect();
        self.derive(clones)
    }

    /// Wrap every node in its own copy of the first element of `wrapper_html`
    pub fn wrap(&self, wrapper_html: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            let Some(parent) = document.arena().parent(node) else {
                tracing::debug!("Not wrapping detached node {}", node);
                continue;
            };
            let fragment = match document.parse_fragment(parent, wrapper_html.trim()) {
                Ok(fragment) => fragment,
                Err(e) => {
                    tracing::warn!("Could not parse wrapper markup: {}", e);
                    return self;
                }
            };
            let Some(wrapper) = fragment
                .into_iter()
                .find(|&id| document.arena().is_element(id))
            else {
                continue;
            };
            report(
                "wrap",
                document
                    .arena_mut()
                    .insert_before(parent, wrapper, Some(node))
                    .and_then(|_| document.arena_mut().append_child(wrapper, node)),
            );
        }
        self
    }

    /// Replace each node's parent with the node itself
    ///
    /// Siblings go away with the parent. Nodes directly under `<body>` and
    /// nodes whose parent has no parent are left alone.
    pub fn unwrap(&self) -> &Self {
        let mut document = self.window.document_mut();
        let body = document.body();
        for &node in &self.nodes {
            let Some(parent) = document.arena().parent(node) else {
                continue;
            };
            if Some(parent) == body {
                continue;
            }
            let Some(grandparent) = document.arena().parent(parent) else {
                continue;
            };
            report(
                "unwrap",
                document
                    .arena_mut()
                    .insert_before(grandparent, node, Some(parent))
                    .and_then(|_| document.arena_mut().remove_from_parent(parent)),
            );
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::page;
    use crate::MiniQuery;
    use dom::{Window, WindowConfig};

    fn table_page() -> MiniQuery {
        let window = Window::from_html(
            r#"<html><body><table id="t"><tbody id="tb"><tr><td>0</td></tr></tbody></table></body></html>"#,
            WindowConfig::default(),
        )
        .unwrap();
        MiniQuery::new(window)
    }

    #[test]
    fn test_append_prepend_markup_per_node() {
        let mq = page();
        let items = mq.select("#list li");
        items.append("<i>!</i>").prepend("<b>&gt;</b>");

        assert_eq!(mq.select("#list i").len(), 3);
        assert_eq!(mq.select("#list li").first().html().as_deref(), Some("<b>&gt;</b>a<i>!</i>"));
    }

    #[test]
    fn test_append_element_moves() {
        let mq = page();
        let third = mq.select("#third").get(0).unwrap();
        mq.select("#list").append(third);
        assert_eq!(mq.select("#list > span").len(), 1);
        assert_eq!(mq.select("#main > span").len(), 0);

        mq.select("#list").prepend(third);
        let html = mq.select("#list").html().unwrap_or_default();
        assert!(html.starts_with("<span"));
    }

    #[test]
    fn test_detach_then_reinsert_renders_identically() {
        let mq = page();
        let list = mq.select("#list");
        let before = list.html();

        let detached = mq.select("#list li:last-child").detach();
        assert_eq!(detached.len(), 1);
        assert_eq!(list.html().as_deref(), Some("<li>a</li><li class=\"on\">b</li>"));

        list.append(detached.get(0).unwrap());
        assert_eq!(list.html(), before);

        let again = detached.detach().detach();
        assert!(again.is_empty());
    }

    #[test]
    fn test_remove_and_empty() {
        let mq = page();
        mq.select("#list li.on").remove();
        assert_eq!(mq.select("#list li").len(), 2);
        mq.select("#list").empty();
        assert_eq!(mq.select("#list").html().as_deref(), Some(""));
    }

    #[test]
    fn test_deep_clone_is_detached_copy() {
        let mq = page();
        let copies = mq.select("#list li").deep_clone();
        assert_eq!(copies.len(), 3);
        assert_eq!(copies.text().as_deref(), Some("a"));
        assert!(copies.parents().is_empty());

        let single = mq.select("#list").deep_clone();
        assert_eq!(single.len(), 1);
        assert_eq!(single.find("li").len(), 3);
    }

    #[test]
    fn test_wrap_each_node_separately() {
        let mq = page();
        mq.select("#list li").wrap("  <div class=\"w\"><em></em></div> tail ");
        assert_eq!(mq.select("#list > div.w").len(), 3);
        assert_eq!(mq.select("div.w > li").len(), 3);
        assert_eq!(mq.select("div.w > em").len(), 3);
    }

    #[test]
    fn test_unwrap_skips_body_children() {
        let mq = page();
        mq.select("#list li").unwrap();
        assert!(mq.select("#list").is_empty());
        assert_eq!(mq.select("body > li").len(), 1);

        mq.select("#main").unwrap();
        assert_eq!(mq.select("body > #main").len(), 1);
    }

    #[test]
    fn test_table_markup_parses_in_target_context() {
        let mq = table_page();
        let body = mq.select("#tb");
        body.append("<tr><td>1</td></tr>");
        assert_eq!(mq.select("#tb > tr").len(), 2);
        assert_eq!(mq.select("#tb > tr").last().html().as_deref(), Some("<td>1</td>"));

        body.prepend("<tr><td>-1</td></tr>");
        assert_eq!(mq.select("#tb > tr").first().text().as_deref(), Some("-1"));

        body.set_html("<tr><td>2</td></tr>");
        assert_eq!(body.html().as_deref(), Some("<tr><td>2</td></tr>"));

        mq.select("#tb > tr").append("<td>3</td>");
        assert_eq!(mq.select("#tb td").len(), 2);
    }

    #[test]
    fn test_wrap_row_in_table_context() {
        let mq = table_page();
        mq.select("#tb td").wrap("<td class=\"outer\"></td>");
        assert_eq!(mq.select("#tb tr > td.outer > td").len(), 1);
    }
}
