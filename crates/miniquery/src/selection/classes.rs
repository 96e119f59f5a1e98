//! Class list operations

use dom::{Document, NodeId, TokenList};

use super::Selection;

/// Apply `edit` to the class list of an element, writing it back
fn edit_classes(document: &mut Document, node: NodeId, edit: impl FnOnce(&mut TokenList)) {
    let Ok(element) = document.arena_mut().element_mut(node) else {
        return;
    };
    let had_attribute = element.has_attr("class");
    let mut classes = TokenList::from_string(element.attr("class").unwrap_or(""));
    edit(&mut classes);
    if had_attribute || !classes.is_empty() {
        element.set_attr("class", &classes.to_attr_value());
    }
}

impl Selection {
    /// Add one or more space-separated classes to every node
    pub fn add_class(&self, class_name: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            edit_classes(&mut document, node, |classes| {
                class_name.split_whitespace().for_each(|c| classes.add(c))
            });
        }
        self
    }

    pub fn remove_class(&self, class_name: &str) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            edit_classes(&mut document, node, |classes| {
                class_name.split_whitespace().for_each(|c| classes.remove(c))
            });
        }
        self
    }

    /// `Some(class)` flips the class; `None` flips visibility instead
    /// (see [`Selection::toggle_visibility`])
    pub fn toggle(&self, class_name: Option<&str>) -> &Self {
        match class_name {
            Some(class_name) if !class_name.is_empty() => self.toggle_class(class_name, None),
            _ => self.toggle_visibility(),
        }
    }

    /// Add (`Some(true)`), remove (`Some(false)`) or flip (`None`) a class
    pub fn toggle_class(&self, class_name: &str, force: Option<bool>) -> &Self {
        let mut document = self.window.document_mut();
        for &node in &self.nodes {
            edit_classes(&mut document, node, |classes| {
                for class in class_name.split_whitespace() {
                    classes.toggle(class, force);
                }
            });
        }
        self
    }

    /// Whether any node has the class
    pub fn has_class(&self, class_name: &str) -> bool {
        let document = self.window.document();
        self.nodes.iter().any(|&node| {
            document
                .arena()
                .element(node)
                .map(|element| {
                    TokenList::from_string(element.attr("class").unwrap_or("")).contains(class_name)
                })
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::page;

    #[test]
    fn test_add_remove() {
        let mq = page();
        let items = mq.select(".item");
        items.add_class("x y");
        assert_eq!(mq.select(".item.x.y").len(), 3);
        assert_eq!(mq.select("#second").attr("class").as_deref(), Some("item special x y"));

        items.remove_class("x");
        assert_eq!(mq.select(".x").len(), 0);
        assert_eq!(mq.select(".y").len(), 3);
    }

    #[test]
    fn test_has_class_is_existential() {
        let mq = page();
        let items = mq.select(".item");
        assert!(items.has_class("special"));
        assert!(!items.has_class("spec"));
        assert!(!mq.select("#first").has_class("special"));
    }

    #[test]
    fn test_toggle_class_force_round_trip() {
        let mq = page();
        let items = mq.select(".item");
        let before: Vec<_> = items.iter().map(|n| mq.select(n).attr("class")).collect();

        items.toggle_class("special", Some(true));
        assert_eq!(mq.select(".special").len(), 3);
        items.toggle_class("special", Some(false));
        assert_eq!(mq.select(".special").len(), 0);

        items.toggle_class("fresh", Some(true)).toggle_class("fresh", Some(false));
        let after: Vec<_> = items.iter().map(|n| mq.select(n).attr("class")).collect();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn test_toggle_flips_each_node() {
        let mq = page();
        let items = mq.select(".item");
        items.toggle(Some("special"));
        assert!(mq.select("#first").has_class("special"));
        assert!(!mq.select("#second").has_class("special"));
    }
}
