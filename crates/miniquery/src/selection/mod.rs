//! The selection wrapper
//!
//! A `Selection` is an ordered list of node handles plus the window they
//! live in. Reads look at the first node and return `None` when there is
//! none; writes touch every node and return `&Self` so calls chain;
//! derivations (traversal, filtering, cloning) return a new `Selection`.
//!
//! Host failures never surface. They are logged and the node is skipped,
//! so an empty or stale selection degrades to a no-op.

mod animation;
mod classes;
mod content;
mod css;
mod display;
mod events;
mod forms;
mod geometry;
mod mutation;
mod traversal;

use dom::{NodeId, Window};
use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::AnimationRegistry;
use crate::config::QueryConfig;
use crate::target::Target;

pub use forms::{FormEntry, FormObject, FormValue};
pub use geometry::Length;
pub use mutation::Content;

/// State shared by every selection made through one factory
#[derive(Debug, Default)]
pub(crate) struct QueryContext {
    pub(crate) config: QueryConfig,
    pub(crate) animations: RefCell<AnimationRegistry>,
}

impl QueryContext {
    pub(crate) fn new(config: QueryConfig) -> Self {
        Self {
            config,
            animations: RefCell::new(AnimationRegistry::default()),
        }
    }
}

/// An ordered collection of nodes with chainable operations
#[derive(Debug, Clone)]
pub struct Selection {
    window: Window,
    nodes: Vec<NodeId>,
    context: Rc<QueryContext>,
}

impl Selection {
    /// Normalize a target into a node list; unsupported input is empty
    pub(crate) fn resolve(window: &Window, context: &Rc<QueryContext>, target: Target) -> Self {
        let nodes = match target {
            Target::Selector(selector) => match window.document().query_selector_all(&selector) {
                Ok(nodes) => nodes,
                Err(e) => {
                    tracing::warn!("Rejected selector: {}", e);
                    Vec::new()
                }
            },
            Target::Node(node) => vec![node],
            Target::Nodes(nodes) => nodes,
            Target::Empty => Vec::new(),
        };

        let document = window.document();
        let nodes = nodes
            .into_iter()
            .filter(|&id| document.arena().get(id).is_ok())
            .collect();
        drop(document);

        Self {
            window: window.clone(),
            nodes,
            context: Rc::clone(context),
        }
    }

    /// New selection over `nodes` sharing this one's window and context
    pub(crate) fn derive(&self, nodes: Vec<NodeId>) -> Self {
        Self {
            window: self.window.clone(),
            nodes,
            context: Rc::clone(&self.context),
        }
    }

    pub(crate) fn context(&self) -> &Rc<QueryContext> {
        &self.context
    }

    pub(crate) fn config(&self) -> &QueryConfig {
        &self.context.config
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    fn first_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter().copied()
    }
}

/// Log a skipped host operation
fn report<T>(operation: &str, result: dom::Result<T>) {
    if let Err(e) = result {
        tracing::warn!("{} skipped: {}", operation, e);
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::page;
    use crate::Target;

    #[test]
    fn test_normalizes_all_inputs() {
        let mq = page();
        let items = mq.select(".item");
        assert_eq!(items.len(), 3);

        let node = items.get(1).unwrap();
        assert_eq!(mq.select(node).nodes(), &[node]);
        assert_eq!(mq.select(items.nodes().to_vec()).len(), 3);
        assert_eq!(mq.select(&items).len(), 3);
        assert!(mq.select(Target::Empty).is_empty());
        assert!(mq.select(9_999u32).is_empty());
    }

    #[test]
    fn test_invalid_selector_is_empty() {
        let mq = page();
        assert!(mq.select("p[").is_empty());
        assert!(mq.select("::nope").is_empty());
    }

    #[test]
    fn test_empty_selection_reads_and_writes() {
        let mq = page();
        let none = mq.select(".missing");
        assert_eq!(none.text(), None);
        assert_eq!(none.html(), None);
        assert_eq!(none.val(), None);
        assert_eq!(none.attr("id"), None);
        assert_eq!(none.css("color"), None);
        assert_eq!(none.height(), None);
        assert!(!none.has_class("x"));
        assert!(!none.is("div"));

        let snapshot = || {
            let document = mq.window().document();
            document.outer_html(document.document_id()).unwrap()
        };
        let before = snapshot();
        none.set_text("x").add_class("y").set_attr("a", "b").set_css("color", "red").remove();
        let after = snapshot();
        assert_eq!(before, after);
    }
}
