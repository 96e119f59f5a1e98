//! Inline style declarations and stylesheet rules
//!
//! Property names are stored in kebab-case. Callers may pass either the
//! scripting form (`backgroundColor`) or the CSS form (`background-color`);
//! custom properties (`--accent`) are kept verbatim.

use lightningcss::declaration::DeclarationBlock;
use lightningcss::rules::CssRule;
use lightningcss::selector::SelectorList as LightSelectorList;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::selector::SelectorList;

/// Convert a property name to its kebab-case CSS form
pub fn normalize_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether a property name is a custom property (`--name`)
pub fn is_custom_property(name: &str) -> bool {
    name.starts_with("--")
}

/// Split a plain numeric CSS value into number and unit (`"12.5px"` → `(12.5, "px")`)
///
/// Only unsigned decimal numbers followed by an optional alphabetic or `%`
/// unit are accepted; anything else (keywords, calc, lists) yields `None`.
pub fn split_numeric(value: &str) -> Option<(f64, &str)> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    if number.is_empty() || !unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%') {
        return None;
    }
    number.parse::<f64>().ok().map(|n| (n, unit))
}

/// Leading float of a value, like `parseFloat`
pub fn parse_leading_float(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in value.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    value[..end].parse::<f64>().ok()
}

/// A value written to a style property: text or a bare number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Text(String),
    Number(f64),
}

impl CssValue {
    pub fn to_css_string(&self) -> String {
        match self {
            CssValue::Text(s) => s.clone(),
            CssValue::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_string())
    }
}

impl From<&str> for CssValue {
    fn from(value: &str) -> Self {
        CssValue::Text(value.to_string())
    }
}

impl From<String> for CssValue {
    fn from(value: String) -> Self {
        CssValue::Text(value)
    }
}

impl From<f64> for CssValue {
    fn from(value: f64) -> Self {
        CssValue::Number(value)
    }
}

impl From<i32> for CssValue {
    fn from(value: i32) -> Self {
        CssValue::Number(value as f64)
    }
}

/// Ordered list of `property: value` declarations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse a declaration block (`"color: red; width: 10px"`)
    ///
    /// Malformed declarations are dropped, matching how hosts treat them.
    pub fn parse(css: &str) -> Self {
        let mut style = Self::default();
        for declaration in css.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                let name = name.trim();
                let value = value.trim();
                if !name.is_empty() && !value.is_empty() {
                    style.set(name, value);
                }
            }
        }
        style
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = normalize_property_name(name);
        self.declarations
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize_property_name(name);
        let value = value.trim().to_string();
        match self.declarations.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) {
        let name = normalize_property_name(name);
        self.declarations.retain(|(key, _)| *key != name);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize back to attribute text
    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One stylesheet rule: a selector list and its declarations
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: SelectorList,
    pub declarations: InlineStyle,
}

impl StyleRule {
    pub fn parse(selector: &str, declarations: &str) -> Result<Self> {
        Ok(Self {
            selectors: SelectorList::parse(selector)?,
            declarations: InlineStyle::parse(declarations),
        })
    }
}

/// Properties whose zero is a plain number rather than a length
const UNITLESS_PROPERTIES: &[&str] = &[
    "opacity",
    "z-index",
    "order",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "line-height",
    "zoom",
    "orphans",
    "widows",
    "column-count",
    "tab-size",
    "fill-opacity",
    "stroke-opacity",
];

/// Parse a stylesheet into rules
///
/// Top-level style rules are kept in source order. Invalid rules are
/// dropped with a warning; at-rules (`@media`, `@keyframes` ...) are skipped.
pub fn parse_stylesheet(css: &str) -> Vec<StyleRule> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let sheet = match StyleSheet::parse(css, options) {
        Ok(sheet) => sheet,
        Err(e) => {
            tracing::warn!("Could not parse stylesheet: {}", e);
            return Vec::new();
        }
    };

    sheet
        .rules
        .0
        .iter()
        .filter_map(|rule| match rule {
            CssRule::Style(style_rule) => {
                convert_rule(&style_rule.selectors, &style_rule.declarations)
            }
            _ => {
                tracing::trace!("Skipping at-rule in stylesheet");
                None
            }
        })
        .collect()
}

fn convert_rule(selectors: &LightSelectorList, block: &DeclarationBlock) -> Option<StyleRule> {
    let selector_text = match selectors.to_css_string(PrinterOptions::default()) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Could not print selector: {}", e);
            return None;
        }
    };
    let selectors = match SelectorList::parse(&selector_text) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Skipping style rule: {}", e);
            return None;
        }
    };

    let mut declarations = InlineStyle::default();
    let properties = block
        .declarations
        .iter()
        .chain(block.important_declarations.iter());
    for property in properties {
        let name = property.property_id().name().to_string();
        match property.value_to_css_string(PrinterOptions::default()) {
            Ok(value) => declarations.set(&name, &specified_value(&name, &value)),
            Err(e) => tracing::warn!("Dropping declaration '{}': {}", name, e),
        }
    }
    Some(StyleRule {
        selectors,
        declarations,
    })
}

/// Undo printer shorthands so values read the way they are specified:
/// zero lengths keep `px` and fractions keep their leading zero
fn specified_value(name: &str, value: &str) -> String {
    if is_custom_property(name) {
        return value.to_string();
    }
    if value == "0" && !UNITLESS_PROPERTIES.contains(&name) {
        return "0px".to_string();
    }
    value
        .split(' ')
        .map(|token| match (token.strip_prefix('.'), token.strip_prefix("-.")) {
            (Some(rest), _) => format!("0.{}", rest),
            (_, Some(rest)) => format!("-0.{}", rest),
            _ => token.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
