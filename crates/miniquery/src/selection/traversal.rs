//! Tree walking, filtering and matching
//!
//! Derivations that collect from several nodes (`siblings`, `parents`,
//! `closest`) drop duplicates and keep first-seen order. `find` keeps
//! every match, duplicates included.

use ahash::AHashSet;
use dom::{NodeId, PropValue, SelectorList};

use super::Selection;

/// Order-preserving collector that drops repeated nodes
#[derive(Default)]
struct Unique {
    seen: AHashSet<NodeId>,
    nodes: Vec<NodeId>,
}

impl Unique {
    fn push(&mut self, node: NodeId) {
        if self.seen.insert(node) {
            self.nodes.push(node);
        }
    }

    fn extend(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        nodes.into_iter().for_each(|node| self.push(node));
    }
}

impl Selection {
    /// Element siblings of every node, excluding the nodes themselves
    pub fn siblings(&self) -> Selection {
        let document = self.window.document();
        let arena = document.arena();
        let mut out = Unique::default();
        for &node in &self.nodes {
            let Some(parent) = arena.parent(node) else {
                continue;
            };
            out.extend(
                arena
                    .element_children(parent)
                    .into_iter()
                    .filter(|&sibling| sibling != node),
            );
        }
        self.derive(out.nodes)
    }

    /// Element ancestors of every node, nearest first
    pub fn parents(&self) -> Selection {
        let document = self.window.document();
        let mut out = Unique::default();
        for &node in &self.nodes {
            out.extend(document.arena().ancestors(node));
        }
        self.derive(out.nodes)
    }

    /// Next element sibling of each node
    pub fn next(&self) -> Selection {
        let document = self.window.document();
        let nodes = self
            .nodes
            .iter()
            .filter_map(|&node| document.arena().next_element_sibling(node))
            .collect();
        self.derive(nodes)
    }

    /// Previous element sibling of each node
    pub fn prev(&self) -> Selection {
        let document = self.window.document();
        let nodes = self
            .nodes
            .iter()
            .filter_map(|&node| document.arena().previous_element_sibling(node))
            .collect();
        self.derive(nodes)
    }

    pub fn first(&self) -> Selection {
        self.derive(self.nodes.first().copied().into_iter().collect())
    }

    pub fn last(&self) -> Selection {
        self.derive(self.nodes.last().copied().into_iter().collect())
    }

    /// Node at `index`, or an empty selection
    pub fn eq(&self, index: usize) -> Selection {
        self.derive(self.get(index).into_iter().collect())
    }

    /// Nodes for which `predicate(single_node_selection, index)` holds
    pub fn filter(&self, mut predicate: impl FnMut(&Selection, usize) -> bool) -> Selection {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| predicate(&self.derive(vec![**node]), *index))
            .map(|(_, &node)| node)
            .collect();
        self.derive(nodes)
    }

    /// Call `f(single_node_selection, index)` for every node
    pub fn each(&self, mut f: impl FnMut(&Selection, usize)) -> &Self {
        for (index, &node) in self.nodes.iter().enumerate() {
            f(&self.derive(vec![node]), index);
        }
        self
    }

    /// Nodes that do not match `selector`
    pub fn not(&self, selector: &str) -> Selection {
        let Some(selectors) = parse_or_warn(selector) else {
            return self.derive(Vec::new());
        };
        let document = self.window.document();
        let nodes = self
            .nodes
            .iter()
            .copied()
            .filter(|&node| !selectors.matches(document.arena(), node))
            .collect();
        self.derive(nodes)
    }

    /// Descendants of every node matching `selector`, concatenated
    pub fn find(&self, selector: &str) -> Selection {
        let document = self.window.document();
        let mut nodes = Vec::new();
        for &node in &self.nodes {
            match document.query_selector_all_from(node, selector) {
                Ok(found) => nodes.extend(found),
                Err(e) => {
                    tracing::warn!("find: {}", e);
                    return self.derive(Vec::new());
                }
            }
        }
        self.derive(nodes)
    }

    /// Nearest inclusive ancestor of every node matching `selector`
    pub fn closest(&self, selector: &str) -> Selection {
        let document = self.window.document();
        let mut out = Unique::default();
        for &node in &self.nodes {
            match document.closest(node, selector) {
                Ok(found) => out.extend(found),
                Err(e) => {
                    tracing::warn!("closest: {}", e);
                    return self.derive(Vec::new());
                }
            }
        }
        self.derive(out.nodes)
    }

    /// Test the first node
    ///
    /// `:visible`, `:checked` and `:disabled` are answered from the live
    /// node; any other selector starting with `:` is false; everything
    /// else is selector matching.
    pub fn is(&self, selector: &str) -> bool {
        let Some(node) = self.first_node() else {
            return false;
        };
        let document = self.window.document();
        let property_is_true =
            |name: &str| matches!(document.property(node, name), Some(PropValue::Bool(true)));

        match selector {
            ":visible" => {
                document.offset_width(node) > 0.0
                    || document.offset_height(node) > 0.0
                    || !document.client_rects(node).is_empty()
            }
            ":checked" => property_is_true("checked"),
            ":disabled" => property_is_true("disabled"),
            _ if selector.starts_with(':') => false,
            _ => match document.matches(node, selector) {
                Ok(matched) => matched,
                Err(e) => {
                    tracing::warn!("is: {}", e);
                    false
                }
            },
        }
    }
}

fn parse_or_warn(selector: &str) -> Option<SelectorList> {
    match SelectorList::parse(selector) {
        Ok(selectors) => Some(selectors),
        Err(e) => {
            tracing::warn!("Rejected selector: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::page;
    use dom::DomRect;

    #[test]
    fn test_siblings_dedupe_and_exclude_self() {
        let mq = page();
        let siblings = mq.select("#first, #second").siblings();
        let ids: Vec<_> = siblings.iter().map(|n| mq.select(n).attr("id")).collect();
        assert_eq!(
            ids,
            vec![Some("second".into()), Some("third".into()), Some("first".into())]
        );
    }

    #[test]
    fn test_parents_and_closest() {
        let mq = page();
        let parents = mq.select(".item").parents();
        let tags: Vec<_> = parents
            .iter()
            .map(|n| mq.window().document().arena().get(n).unwrap().node_name.clone())
            .collect();
        assert_eq!(tags, vec!["div", "body", "html"]);

        assert_eq!(mq.select(".item").closest("div.panel").len(), 1);
        assert_eq!(mq.select("#first").closest("p").attr("id").as_deref(), Some("first"));
        assert!(mq.select("#first").closest("ul").is_empty());
        assert!(mq.select("#first").closest("p[").is_empty());
    }

    #[test]
    fn test_next_prev_first_last_eq() {
        let mq = page();
        let items = mq.select(".item");
        assert_eq!(items.next().len(), 2);
        assert_eq!(items.prev().first().attr("id").as_deref(), Some("first"));
        assert_eq!(items.last().attr("id").as_deref(), Some("third"));
        assert_eq!(items.eq(1).attr("id").as_deref(), Some("second"));
        assert!(items.eq(5).is_empty());
        assert!(mq.select(".missing").first().is_empty());
    }

    #[test]
    fn test_filter_each_not_find() {
        let mq = page();
        let items = mq.select(".item");
        let odd = items.filter(|_, i| i % 2 == 1);
        assert_eq!(odd.attr("id").as_deref(), Some("second"));
        let paragraphs = items.filter(|s, _| s.is("p"));
        assert_eq!(paragraphs.len(), 2);

        let mut seen = Vec::new();
        items.each(|s, i| seen.push((i, s.text().unwrap_or_default())));
        assert_eq!(seen, vec![(0, "One".into()), (1, "Two".into()), (2, "Three".into())]);

        assert_eq!(items.not(".special").len(), 2);
        assert!(items.not("[").is_empty());

        let nested = mq.select("body, #main").find("p");
        assert_eq!(nested.len(), 4);
        assert!(mq.select("#main").find("li").is_empty());
    }

    #[test]
    fn test_is_pseudo_classes() {
        let mq = page();
        assert!(mq.select("input[name=news]").is(":checked"));
        assert!(!mq.select("input[name=spam]").is(":checked"));
        assert!(mq.select("input[name=locked]").is(":disabled"));
        assert!(!mq.select("input[name=inner]").is(":disabled"));
        assert!(!mq.select("#main").is(":hover"));
        assert!(mq.select("#main").is("div.open"));
        assert!(!mq.select("#main").is("div["));

        let main = mq.select("#main");
        assert!(!main.is(":visible"));
        mq.window()
            .document_mut()
            .set_layout(main.get(0).unwrap(), DomRect::new(0.0, 0.0, 10.0, 0.0))
            .unwrap();
        assert!(main.is(":visible"));
        main.hide();
        assert!(!main.is(":visible"));
    }
}
