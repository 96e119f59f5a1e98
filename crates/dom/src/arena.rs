//! Arena-based DOM tree storage
//!
//! Nodes live in a single `Vec<DomNode>` and refer to each other by index.
//! Detaching a node only unlinks it: its handle stays valid and it can be
//! re-inserted anywhere later.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

/// Form controls that honor the `disabled` attribute
const DISABLEABLE: &[&str] = &["button", "input", "select", "textarea", "option", "fieldset"];

/// Arena allocator for DOM nodes
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Root node ID (the document node, if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    fn add_node(&mut self, node_type: NodeType, name: &str) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(DomNode::new(node_id, node_type, name));
        node_id
    }

    /// Create a detached element (tag names are lowercased)
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.add_node(NodeType::Element, &tag.to_ascii_lowercase())
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = self.add_node(NodeType::Text, "#text");
        self.nodes[id as usize].node_value = text.to_string();
        id
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let id = self.add_node(NodeType::Comment, "#comment");
        self.nodes[id as usize].node_value = text.to_string();
        id
    }

    /// Create an element as the last child of `parent_id`, skipping the
    /// hierarchy check. A missing parent leaves the element detached.
    pub(crate) fn create_child_element(&mut self, parent_id: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        if let Some(parent) = self.nodes.get_mut(parent_id as usize) {
            parent.children_ids.push(id);
            self.nodes[id as usize].parent_id = Some(parent_id);
        }
        id
    }

    /// Create a document node and make it the root
    pub fn create_document(&mut self) -> NodeId {
        let id = self.add_node(NodeType::Document, "#document");
        self.root_id = Some(id);
        id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get element by ID, rejecting text/comment/document nodes
    pub fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(DomError::InvalidNodeType {
                expected: "Element".to_string(),
                actual: format!("{:?}", node.node_type),
            })
        }
    }

    /// Mutable variant of [`DomArena::element`]
    pub fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.element(node_id)?;
        self.get_mut(node_id)
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.get(node_id).map(|n| n.is_element()).unwrap_or(false)
    }

    /// Child IDs of a node (empty for unknown nodes)
    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.get(node_id)
            .map(|n| n.children_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Element children only
    pub fn element_children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.children(node_id)
            .iter()
            .copied()
            .filter(|&id| self.is_element(id))
            .collect()
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.get(node_id).ok().and_then(|n| n.parent_id)
    }

    /// Parent if it is an element (the document node is not)
    pub fn parent_element(&self, node_id: NodeId) -> Option<NodeId> {
        self.parent(node_id).filter(|&p| self.is_element(p))
    }

    /// Element ancestors, nearest first
    pub fn ancestors(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent_element(node_id);
        while let Some(id) = current {
            result.push(id);
            current = self.parent_element(id);
        }
        result
    }

    /// All descendants in document (pre-)order, excluding the node itself
    pub fn descendants(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node_id).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        result
    }

    /// Descendant elements in document order
    pub fn descendant_elements(&self, node_id: NodeId) -> Vec<NodeId> {
        self.descendants(node_id)
            .into_iter()
            .filter(|&id| self.is_element(id))
            .collect()
    }

    fn sibling_position(&self, node_id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(node_id)?;
        let index = self.children(parent).iter().position(|&c| c == node_id)?;
        Some((parent, index))
    }

    pub fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_position(node_id)?;
        self.children(parent)[index + 1..]
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    pub fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_position(node_id)?;
        self.children(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// Inclusive containment check
    pub fn contains(&self, ancestor: NodeId, node_id: NodeId) -> bool {
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Unlink a node from its parent. Returns whether it had one.
    pub fn remove_from_parent(&mut self, node_id: NodeId) -> Result<bool> {
        let Some(parent_id) = self.get(node_id)?.parent_id else {
            return Ok(false);
        };
        self.get_mut(parent_id)?
            .children_ids
            .retain(|c| *c != node_id);
        self.get_mut(node_id)?.parent_id = None;
        Ok(true)
    }

    fn check_insertion(&self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        self.get(child_id)?;
        let parent = self.get(parent_id)?;
        if parent.is_text() || parent.node_type == NodeType::Comment {
            return Err(DomError::HierarchyRequest(format!(
                "node {} cannot have children",
                parent_id
            )));
        }
        if self.contains(child_id, parent_id) {
            return Err(DomError::HierarchyRequest(format!(
                "node {} is an ancestor of {}",
                child_id, parent_id
            )));
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        self.insert_before(parent_id, child_id, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent_id: NodeId,
        child_id: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.check_insertion(parent_id, child_id)?;
        if reference == Some(child_id) {
            return Ok(());
        }
        self.remove_from_parent(child_id)?;

        let parent = self.get_mut(parent_id)?;
        let index = reference
            .and_then(|r| parent.children_ids.iter().position(|&c| c == r))
            .unwrap_or(parent.children_ids.len());
        parent.children_ids.insert(index, child_id);
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        Ok(())
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child in children {
            self.get_mut(child)?.parent_id = None;
        }
        Ok(())
    }

    /// Deep copy of a subtree; the copy is detached
    ///
    /// Iterative, no recursion: (source, copied parent) pairs on a stack.
    pub fn deep_clone(&mut self, node_id: NodeId) -> Result<NodeId> {
        let root_copy = self.copy_node(node_id)?;
        let mut stack: Vec<(NodeId, NodeId)> = vec![(node_id, root_copy)];

        while let Some((source, copy)) = stack.pop() {
            let children: Vec<NodeId> = self.children(source).to_vec();
            for child in children {
                let child_copy = self.copy_node(child)?;
                self.get_mut(copy)?.children_ids.push(child_copy);
                self.get_mut(child_copy)?.parent_id = Some(copy);
                stack.push((child, child_copy));
            }
        }

        Ok(root_copy)
    }

    fn copy_node(&mut self, node_id: NodeId) -> Result<NodeId> {
        let new_id = self.nodes.len() as NodeId;
        let copy = self.get(node_id)?.detached_copy(new_id);
        self.nodes.push(copy);
        Ok(new_id)
    }

    /// Concatenated text of all descendant text nodes (`textContent`)
    pub fn text_content(&self, node_id: NodeId) -> String {
        let Ok(node) = self.get(node_id) else {
            return String::new();
        };
        match node.node_type {
            NodeType::Text | NodeType::Comment => node.node_value.clone(),
            _ => {
                let mut text = String::new();
                for id in self.descendants(node_id) {
                    if let Ok(child) = self.get(id) {
                        if child.is_text() {
                            text.push_str(&child.node_value);
                        }
                    }
                }
                text
            }
        }
    }

    /// Replace all children with a single text node (none for empty text)
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        if !self.get(node_id)?.is_element() {
            self.get_mut(node_id)?.node_value = text.to_string();
            return Ok(());
        }
        self.remove_children(node_id)?;
        if !text.is_empty() {
            let text_id = self.create_text(text);
            self.append_child(node_id, text_id)?;
        }
        Ok(())
    }

    /// Find first attached element with the given `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root_id?;
        self.descendant_elements(root)
            .into_iter()
            .find(|&n| self.get(n).map(|node| node.attr("id") == Some(id)).unwrap_or(false))
    }

    /// Checkedness of a checkbox/radio (or selectedness of an option)
    pub fn is_checked(&self, node_id: NodeId) -> bool {
        let Ok(node) = self.element(node_id) else {
            return false;
        };
        if node.is_tag("option") {
            return node.props.selected.unwrap_or_else(|| node.has_attr("selected"));
        }
        if !node.is_tag("input") {
            return false;
        }
        let kind = node.attr("type").unwrap_or("text").to_ascii_lowercase();
        (kind == "checkbox" || kind == "radio")
            && node.props.checked.unwrap_or_else(|| node.has_attr("checked"))
    }

    /// Disabled form control, directly or through a disabled `<fieldset>`
    pub fn is_disabled(&self, node_id: NodeId) -> bool {
        let Ok(node) = self.element(node_id) else {
            return false;
        };
        if !DISABLEABLE.contains(&node.node_name.as_str()) {
            return false;
        }
        if node.has_attr("disabled") {
            return true;
        }
        self.ancestors(node_id).into_iter().any(|a| {
            self.get(a)
                .map(|n| n.is_tag("fieldset") && n.has_attr("disabled"))
                .unwrap_or(false)
        })
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
