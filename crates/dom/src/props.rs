//! Live node properties
//!
//! Properties are what scripts see on the element object. Some reflect an
//! attribute (`id`, `className`), some hold dirty form state that diverges
//! from the attribute once written (`value`, `checked`, `selected`), and
//! anything else is an expando stored on the node.

use crate::document::Document;
use crate::error::Result;
use crate::types::*;
use crate::utils::{collapse_whitespace, dataset_attribute_name, dataset_key};

impl Document {
    /// `el.value` for form controls; `None` for elements without one
    pub fn value(&self, node_id: NodeId) -> Option<String> {
        let node = self.arena().element(node_id).ok()?;
        match node.node_name.as_str() {
            "input" => Some(node.props.value.clone().unwrap_or_else(|| {
                match node.attr("value") {
                    Some(v) => v.to_string(),
                    None if is_checkable(node) => "on".to_string(),
                    None => String::new(),
                }
            })),
            "textarea" => Some(
                node.props
                    .value
                    .clone()
                    .unwrap_or_else(|| self.arena().text_content(node_id)),
            ),
            "select" => Some(
                self.selected_options(node_id)
                    .first()
                    .and_then(|&option| self.value(option))
                    .unwrap_or_default(),
            ),
            "option" => Some(match node.attr("value") {
                Some(v) => v.to_string(),
                None => collapse_whitespace(&self.arena().text_content(node_id)),
            }),
            "button" | "data" | "param" => Some(node.attr("value").unwrap_or("").to_string()),
            _ => node.props.expando.get("value").map(|v| v.to_string()),
        }
    }

    /// Write `el.value`
    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let tag = self.arena().element(node_id)?.node_name.clone();
        match tag.as_str() {
            "input" | "textarea" => {
                self.arena_mut().get_mut(node_id)?.props.value = Some(value.to_string());
            }
            "select" => {
                for option in self.options(node_id) {
                    let selected = self.value(option).as_deref() == Some(value);
                    self.arena_mut().get_mut(option)?.props.selected = Some(selected);
                }
            }
            "option" | "button" | "data" | "param" => {
                self.arena_mut().get_mut(node_id)?.set_attr("value", value);
            }
            _ => {
                self.arena_mut()
                    .get_mut(node_id)?
                    .props
                    .expando
                    .insert("value".to_string(), PropValue::from(value));
            }
        }
        Ok(())
    }

    /// `<option>` descendants of a `<select>`, in document order
    pub fn options(&self, select_id: NodeId) -> Vec<NodeId> {
        self.arena()
            .descendant_elements(select_id)
            .into_iter()
            .filter(|&id| self.arena().get(id).map(|n| n.is_tag("option")).unwrap_or(false))
            .collect()
    }

    /// Selected options; a single-choice select with none marked selects
    /// its first enabled option
    pub fn selected_options(&self, select_id: NodeId) -> Vec<NodeId> {
        let options = self.options(select_id);
        let selected: Vec<NodeId> = options
            .iter()
            .copied()
            .filter(|&id| self.arena().is_checked(id))
            .collect();
        let multiple = self
            .arena()
            .get(select_id)
            .map(|n| n.has_attr("multiple"))
            .unwrap_or(false);

        if multiple {
            return selected;
        }
        if let Some(&last) = selected.last() {
            return vec![last];
        }
        options
            .into_iter()
            .find(|&id| !self.arena().is_disabled(id))
            .into_iter()
            .collect()
    }

    /// Read a property (`el[name]`); `None` when the element has no such property
    pub fn property(&self, node_id: NodeId, name: &str) -> Option<PropValue> {
        let node = self.arena().get(node_id).ok()?;
        let value = match name {
            "nodeType" => PropValue::Number(node.node_type as u8 as f64),
            "nodeName" => PropValue::from(node.node_name.to_ascii_uppercase()),
            "textContent" => PropValue::from(self.arena().text_content(node_id)),
            _ if !node.is_element() => return None,
            "tagName" => PropValue::from(node.node_name.to_ascii_uppercase()),
            "id" => PropValue::from(node.attr("id").unwrap_or("")),
            "className" => PropValue::from(node.attr("class").unwrap_or("")),
            "name" => PropValue::from(node.attr("name").unwrap_or("")),
            "hidden" => PropValue::from(node.has_attr("hidden")),
            "innerHTML" => PropValue::from(self.inner_html(node_id).ok()?),
            "outerHTML" => PropValue::from(self.outer_html(node_id).ok()?),
            "checked" if node.is_tag("input") => {
                PropValue::from(node.props.checked.unwrap_or_else(|| node.has_attr("checked")))
            }
            "selected" if node.is_tag("option") => {
                PropValue::from(self.arena().is_checked(node_id))
            }
            "disabled" if is_form_control(node) => PropValue::from(node.has_attr("disabled")),
            "type" if node.is_tag("input") => {
                PropValue::from(node.attr("type").unwrap_or("text").to_ascii_lowercase())
            }
            "value" => match self.value(node_id) {
                Some(v) => PropValue::from(v),
                None => return None,
            },
            _ => return node.props.expando.get(name).cloned(),
        };
        Some(value)
    }

    /// Write a property (`el[name] = value`)
    pub fn set_property(&mut self, node_id: NodeId, name: &str, value: PropValue) -> Result<()> {
        let node = self.arena().element(node_id)?;
        let is_input = node.is_tag("input");
        let is_option = node.is_tag("option");
        let is_control = is_form_control(node);

        match name {
            "checked" if is_input => self.set_checked(node_id, value.truthy())?,
            "selected" if is_option => self.set_selected(node_id, value.truthy())?,
            "disabled" if is_control => self.reflect_bool(node_id, "disabled", value.truthy())?,
            "hidden" => self.reflect_bool(node_id, "hidden", value.truthy())?,
            "value" => self.set_value(node_id, &value.to_string())?,
            "id" | "name" => self.arena_mut().get_mut(node_id)?.set_attr(name, &value.to_string()),
            "className" => self.arena_mut().get_mut(node_id)?.set_attr("class", &value.to_string()),
            "type" if is_input => {
                self.arena_mut().get_mut(node_id)?.set_attr("type", &value.to_string())
            }
            "textContent" => self.arena_mut().set_text_content(node_id, &value.to_string())?,
            "innerHTML" => self.set_inner_html(node_id, &value.to_string())?,
            "tagName" | "nodeName" | "nodeType" | "outerHTML" => {
                tracing::debug!("Ignoring write to read-only property {}", name);
            }
            _ => {
                self.arena_mut()
                    .get_mut(node_id)?
                    .props
                    .expando
                    .insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    fn reflect_bool(&mut self, node_id: NodeId, attr: &str, on: bool) -> Result<()> {
        let node = self.arena_mut().get_mut(node_id)?;
        if on {
            node.set_attr(attr, "");
        } else {
            node.remove_attr(attr);
        }
        Ok(())
    }

    /// Checking a radio unchecks the others in its group
    fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        self.arena_mut().get_mut(node_id)?.props.checked = Some(checked);
        let node = self.arena().get(node_id)?;
        let is_radio = node
            .attr("type")
            .map(|t| t.eq_ignore_ascii_case("radio"))
            .unwrap_or(false);
        let Some(group) = node.attr("name").map(str::to_string) else {
            return Ok(());
        };
        if !(checked && is_radio) {
            return Ok(());
        }

        let scope = self
            .closest(node_id, "form")
            .ok()
            .flatten()
            .unwrap_or(self.document_id());
        let others: Vec<NodeId> = self
            .arena()
            .descendant_elements(scope)
            .into_iter()
            .filter(|&id| id != node_id)
            .filter(|&id| {
                self.arena()
                    .get(id)
                    .map(|n| {
                        n.is_tag("input")
                            && n.attr("type")
                                .map(|t| t.eq_ignore_ascii_case("radio"))
                                .unwrap_or(false)
                            && n.attr("name") == Some(group.as_str())
                    })
                    .unwrap_or(false)
            })
            .collect();
        for other in others {
            self.arena_mut().get_mut(other)?.props.checked = Some(false);
        }
        Ok(())
    }

    /// Selecting an option of a single-choice select deselects its siblings
    fn set_selected(&mut self, node_id: NodeId, selected: bool) -> Result<()> {
        self.arena_mut().get_mut(node_id)?.props.selected = Some(selected);
        if !selected {
            return Ok(());
        }
        let Some(select) = self.closest(node_id, "select").ok().flatten() else {
            return Ok(());
        };
        if self.arena().get(select)?.has_attr("multiple") {
            return Ok(());
        }
        for option in self.options(select) {
            if option != node_id {
                self.arena_mut().get_mut(option)?.props.selected = Some(false);
            }
        }
        Ok(())
    }

    /// `el.dataset[key]`
    pub fn dataset(&self, node_id: NodeId, key: &str) -> Option<String> {
        self.arena()
            .element(node_id)
            .ok()?
            .attr(&dataset_attribute_name(key))
            .map(str::to_string)
    }

    /// `el.dataset[key] = value`
    pub fn set_dataset(&mut self, node_id: NodeId, key: &str, value: &str) -> Result<()> {
        self.arena_mut()
            .element_mut(node_id)?
            .set_attr(&dataset_attribute_name(key), value);
        Ok(())
    }

    /// All dataset entries as (camelCase key, value)
    pub fn dataset_entries(&self, node_id: NodeId) -> Vec<(String, String)> {
        let Ok(node) = self.arena().element(node_id) else {
            return Vec::new();
        };
        node.attributes()
            .iter()
            .filter_map(|(name, value)| dataset_key(name).map(|key| (key, value.clone())))
            .collect()
    }
}

fn is_checkable(node: &DomNode) -> bool {
    node.attr("type")
        .map(|t| t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio"))
        .unwrap_or(false)
}

fn is_form_control(node: &DomNode) -> bool {
    ["button", "input", "select", "textarea", "option", "optgroup", "fieldset"]
        .contains(&node.node_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Document {
        Document::parse(
            r#"<body><form id="f">
                <input id="name" name="name" value="Ann">
                <input id="agree" type="checkbox" name="agree" checked>
                <input id="r1" type="radio" name="size" value="s" checked>
                <input id="r2" type="radio" name="size" value="m">
                <textarea id="bio">hello</textarea>
                <select id="color"><option>red</option><option value="g">green</option></select>
                <div id="plain" data-user-id="7"></div>
            </form></body>"#,
        )
        .unwrap()
    }

    fn id(doc: &Document, id: &str) -> NodeId {
        doc.get_element_by_id(id).unwrap()
    }

    #[test]
    fn test_values_and_dirty_state() {
        let mut doc = form();
        let name = id(&doc, "name");
        assert_eq!(doc.value(name).as_deref(), Some("Ann"));
        doc.set_value(name, "Bob").unwrap();
        assert_eq!(doc.value(name).as_deref(), Some("Bob"));
        assert_eq!(doc.arena().get(name).unwrap().attr("value"), Some("Ann"));

        assert_eq!(doc.value(id(&doc, "bio")).as_deref(), Some("hello"));
        assert_eq!(doc.value(id(&doc, "agree")).as_deref(), Some("on"));
        assert_eq!(doc.value(id(&doc, "plain")), None);
    }

    #[test]
    fn test_select_value() {
        let mut doc = form();
        let select = id(&doc, "color");
        assert_eq!(doc.value(select).as_deref(), Some("red"));
        doc.set_value(select, "g").unwrap();
        assert_eq!(doc.value(select).as_deref(), Some("g"));
        assert_eq!(doc.selected_options(select).len(), 1);
    }

    #[test]
    fn test_checked_property_diverges_from_attribute() {
        let mut doc = form();
        let agree = id(&doc, "agree");
        doc.set_property(agree, "checked", PropValue::from(false)).unwrap();
        assert_eq!(doc.property(agree, "checked"), Some(PropValue::Bool(false)));
        assert!(doc.arena().get(agree).unwrap().has_attr("checked"));
    }

    #[test]
    fn test_radio_group_exclusive() {
        let mut doc = form();
        let (r1, r2) = (id(&doc, "r1"), id(&doc, "r2"));
        doc.set_property(r2, "checked", PropValue::from(true)).unwrap();
        assert!(!doc.arena().is_checked(r1));
        assert!(doc.arena().is_checked(r2));
    }

    #[test]
    fn test_reflected_and_expando_properties() {
        let mut doc = form();
        let plain = id(&doc, "plain");
        assert_eq!(doc.property(plain, "tagName"), Some(PropValue::from("DIV")));
        assert_eq!(doc.property(plain, "custom"), None);

        doc.set_property(plain, "custom", PropValue::from(3)).unwrap();
        assert_eq!(doc.property(plain, "custom"), Some(PropValue::Number(3.0)));
        doc.set_property(plain, "className", PropValue::from("x y")).unwrap();
        assert_eq!(doc.arena().get(plain).unwrap().attr("class"), Some("x y"));
    }

    #[test]
    fn test_dataset() {
        let mut doc = form();
        let plain = id(&doc, "plain");
        assert_eq!(doc.dataset(plain, "userId").as_deref(), Some("7"));
        doc.set_dataset(plain, "role", "admin").unwrap();
        assert_eq!(doc.arena().get(plain).unwrap().attr("data-role"), Some("admin"));
        assert_eq!(doc.dataset_entries(plain).len(), 2);
    }
}
