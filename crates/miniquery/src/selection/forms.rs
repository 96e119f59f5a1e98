//! Form serialization
//!
//! Successful controls are collected from the first node when it is a
//! `<form>`: named `input`, `select`, `textarea` and `button` descendants
//! that are enabled (fieldsets included), not file or button-like inputs,
//! and checked when they are checkboxes or radios. A multi-select yields
//! one entry per selected option.

use dom::{Document, NodeId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::Selection;

/// Input types that never contribute a value
const SKIPPED_TYPES: &[&str] = &["file", "submit", "button", "reset", "image"];

/// One successful control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
    pub name: String,
    pub value: String,
}

/// Value of a name in [`FormObject`]: one value, or all values in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FormValue {
    fn push(&mut self, value: String) {
        match self {
            FormValue::Single(first) => {
                *self = FormValue::Multiple(vec![std::mem::take(first), value]);
            }
            FormValue::Multiple(values) => values.push(value),
        }
    }
}

/// Entries grouped by name in first-seen order; serializes as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormObject {
    entries: Vec<(String, FormValue)>,
}

impl FormObject {
    fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((name, FormValue::Single(value))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Serialize for FormObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Type of a control as the form sees it
fn control_type(document: &Document, node: NodeId) -> Option<String> {
    let element = document.arena().element(node).ok()?;
    let kind = match element.node_name.as_str() {
        "input" => element.attr("type").unwrap_or("text").to_ascii_lowercase(),
        "button" => element.attr("type").unwrap_or("submit").to_ascii_lowercase(),
        "select" if element.has_attr("multiple") => "select-multiple".to_string(),
        "select" => "select-one".to_string(),
        "textarea" => "textarea".to_string(),
        _ => return None,
    };
    Some(kind)
}

fn collect_entries(document: &Document, form: NodeId) -> Vec<FormEntry> {
    let arena = document.arena();
    let mut entries = Vec::new();
    for control in arena.descendant_elements(form) {
        let Some(kind) = control_type(document, control) else {
            continue;
        };
        let name = match arena.get(control).ok().and_then(|n| n.attr("name")) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        if arena.is_disabled(control) || SKIPPED_TYPES.contains(&kind.as_str()) {
            continue;
        }
        if (kind == "checkbox" || kind == "radio") && !arena.is_checked(control) {
            continue;
        }

        if kind.starts_with("select") {
            for option in document.selected_options(control) {
                entries.push(FormEntry {
                    name: name.clone(),
                    value: document.value(option).unwrap_or_default(),
                });
            }
            continue;
        }
        entries.push(FormEntry {
            name,
            value: document.value(control).unwrap_or_default(),
        });
    }
    entries
}

impl Selection {
    /// Successful controls of the first node, in document order
    ///
    /// Empty when the selection is empty or the first node is not a form.
    pub fn serialize_array(&self) -> Vec<FormEntry> {
        let Some(form) = self.first_node() else {
            return Vec::new();
        };
        let document = self.window.document();
        let is_form = document
            .arena()
            .element(form)
            .map(|element| element.is_tag("form"))
            .unwrap_or(false);
        if !is_form {
            tracing::debug!("serialize on non-form node {}", form);
            return Vec::new();
        }
        collect_entries(&document, form)
    }

    /// Entries grouped by name; repeated names collect into a list
    pub fn serialize_object(&self) -> FormObject {
        let mut object = FormObject::default();
        for entry in self.serialize_array() {
            object.insert(entry.name, entry.value);
        }
        object
    }

    /// `application/x-www-form-urlencoded` string of the entries
    pub fn serialize(&self) -> String {
        let pairs: Vec<(String, String)> = self
            .serialize_array()
            .into_iter()
            .map(|entry| (entry.name, entry.value))
            .collect();
        match serde_urlencoded::to_string(&pairs) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!("Could not encode form: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::page;
    use super::*;

    fn entry(name: &str, value: &str) -> FormEntry {
        FormEntry {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_serialize_array_successful_controls() {
        let mq = page();
        assert_eq!(
            mq.select("#signup").serialize_array(),
            vec![
                entry("user", "ann"),
                entry("tag", "a"),
                entry("tag", "b"),
                entry("news", "yes"),
                entry("plan", "pro"),
                entry("bio", "hi there"),
                entry("langs", "rs"),
                entry("langs", "C"),
            ]
        );
    }

    #[test]
    fn test_serialize_urlencoded() {
        let mq = page();
        assert_eq!(
            mq.select("#signup").serialize(),
            "user=ann&tag=a&tag=b&news=yes&plan=pro&bio=hi+there&langs=rs&langs=C"
        );
    }

    #[test]
    fn test_serialize_object_groups_repeats() {
        let mq = page();
        let object = mq.select("#signup").serialize_object();
        assert_eq!(object.len(), 6);
        assert_eq!(object.get("user"), Some(&FormValue::Single("ann".into())));
        assert_eq!(
            object.get("tag"),
            Some(&FormValue::Multiple(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            object.to_json(),
            serde_json::json!({
                "user": "ann",
                "tag": ["a", "b"],
                "news": "yes",
                "plan": "pro",
                "bio": "hi there",
                "langs": ["rs", "C"],
            })
        );
        let json = object.to_json();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["user", "tag", "news", "plan", "bio", "langs"]);
    }

    #[test]
    fn test_serialize_reflects_live_state() {
        let mq = page();
        mq.select("input[name=spam]").set_prop("checked", true);
        mq.select("input[value=free]").set_prop("checked", true);
        mq.select("input[name=user]").set_val("bo b");
        mq.select("select[name=langs]").set_val("go");

        let form = mq.select("#signup");
        let object = form.serialize_object();
        assert_eq!(object.get("spam"), Some(&FormValue::Single("yes".into())));
        assert_eq!(object.get("langs"), Some(&FormValue::Single("go".into())));
        assert!(form.serialize().starts_with("user=bo+b&"));
    }

    #[test]
    fn test_non_form_is_empty() {
        let mq = page();
        assert!(mq.select("#main").serialize_array().is_empty());
        assert_eq!(mq.select(".missing").serialize(), "");
        assert!(mq.select("#list").serialize_object().is_empty());
    }
}
