//! What a selection can be built from

use dom::NodeId;

use crate::selection::Selection;

/// Input accepted by [`crate::MiniQuery::select`]
///
/// A selector string, one node, or a collection of nodes. Everything
/// normalizes to an ordered node list; `Empty` yields an empty selection.
#[derive(Debug, Clone)]
pub enum Target {
    Selector(String),
    Node(NodeId),
    Nodes(Vec<NodeId>),
    Empty,
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<&String> for Target {
    fn from(selector: &String) -> Self {
        Target::Selector(selector.clone())
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl From<Option<NodeId>> for Target {
    fn from(node: Option<NodeId>) -> Self {
        node.map(Target::Node).unwrap_or(Target::Empty)
    }
}

impl From<Vec<NodeId>> for Target {
    fn from(nodes: Vec<NodeId>) -> Self {
        Target::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Target {
    fn from(nodes: &[NodeId]) -> Self {
        Target::Nodes(nodes.to_vec())
    }
}

impl<const N: usize> From<[NodeId; N]> for Target {
    fn from(nodes: [NodeId; N]) -> Self {
        Target::Nodes(nodes.to_vec())
    }
}

impl From<&Selection> for Target {
    fn from(selection: &Selection) -> Self {
        Target::Nodes(selection.nodes().to_vec())
    }
}

impl From<Selection> for Target {
    fn from(selection: Selection) -> Self {
        Target::from(&selection)
    }
}
