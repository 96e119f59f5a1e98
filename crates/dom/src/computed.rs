//! Computed style and host-provided geometry
//!
//! Cascade order: inline declarations, then the
//! matching stylesheet rule with the highest (specificity, source order),
//! then inheritance, then initial values. There is no layout engine;
//! boxes come from whoever embeds the document.

use crate::color::parse_color;
use crate::document::Document;
use crate::error::Result;
use crate::style::{is_custom_property, normalize_property_name};
use crate::types::*;
use crate::utils::px;

impl Document {
    /// `getComputedStyle(node).getPropertyValue(property)`
    ///
    /// Non-elements and unknown properties yield an empty string.
    pub fn computed_style(&self, node_id: NodeId, property: &str) -> String {
        let name = normalize_property_name(property);
        if !self.arena().is_element(node_id) {
            return String::new();
        }

        let mut current = node_id;
        loop {
            if let Some(value) = self.cascaded_value(current, &name) {
                return normalize_computed(&name, value);
            }
            let inherits =
                is_custom_property(&name) || INHERITED_PROPERTIES.contains(&name.as_str());
            match self.arena().parent_element(current) {
                Some(parent) if inherits => current = parent,
                _ => break,
            }
        }

        self.initial_value(node_id, &name)
    }

    /// Specified value from inline style or the winning stylesheet rule
    fn cascaded_value(&self, node_id: NodeId, name: &str) -> Option<String> {
        let node = self.arena().get(node_id).ok()?;
        if let Some(value) = node.style().get(name) {
            return Some(value.to_string());
        }
        self.style_rules()
            .iter()
            .enumerate()
            .filter_map(|(order, rule)| {
                let value = rule.declarations.get(name)?;
                let specificity = rule.selectors.matching_specificity(self.arena(), node_id)?;
                Some(((specificity, order), value))
            })
            .max_by_key(|(key, _)| *key)
            .map(|(_, value)| value.to_string())
    }

    fn initial_value(&self, node_id: NodeId, name: &str) -> String {
        let Ok(node) = self.arena().get(node_id) else {
            return String::new();
        };
        let value = match name {
            "display" => initial_display(node),
            "opacity" => "1",
            "visibility" => "visible",
            "overflow" | "overflow-x" | "overflow-y" => "visible",
            "position" => "static",
            "max-height" | "max-width" => "none",
            "min-height" | "min-width" => "0px",
            "top" | "left" | "right" | "bottom" | "z-index" => "auto",
            "color" => "rgb(0, 0, 0)",
            "background-color" => "rgba(0, 0, 0, 0)",
            "font-size" => "16px",
            "line-height" => "normal",
            "width" | "height" => {
                return match (self.is_rendered(node_id), node.layout) {
                    (true, Some(rect)) if name == "width" => px(rect.width),
                    (true, Some(rect)) => px(rect.height),
                    _ => "auto".to_string(),
                };
            }
            _ if name.starts_with("margin") || name.starts_with("padding") => "0px",
            _ if name.starts_with("border") && name.ends_with("width") => "0px",
            _ => "",
        };
        value.to_string()
    }

    /// Element is attached and neither it nor an ancestor is `display: none`
    pub fn is_rendered(&self, node_id: NodeId) -> bool {
        if !self.arena().is_element(node_id) || !self.is_connected(node_id) {
            return false;
        }
        std::iter::once(node_id)
            .chain(self.arena().ancestors(node_id))
            .all(|id| self.computed_style(id, "display") != "none")
    }

    /// Host-provided layout box (document coordinates)
    pub fn layout_box(&self, node_id: NodeId) -> Option<DomRect> {
        self.arena().get(node_id).ok().and_then(|n| n.layout)
    }

    pub fn set_layout(&mut self, node_id: NodeId, rect: DomRect) -> Result<()> {
        self.arena_mut().element_mut(node_id)?.layout = Some(rect);
        Ok(())
    }

    /// `offsetWidth`: box width, zero when not rendered
    pub fn offset_width(&self, node_id: NodeId) -> f64 {
        self.rendered_box(node_id).map(|r| r.width).unwrap_or(0.0)
    }

    /// `offsetHeight`: box height, zero when not rendered
    pub fn offset_height(&self, node_id: NodeId) -> f64 {
        self.rendered_box(node_id).map(|r| r.height).unwrap_or(0.0)
    }

    /// `getClientRects()` in document coordinates: one box when rendered
    pub fn client_rects(&self, node_id: NodeId) -> Vec<DomRect> {
        self.rendered_box(node_id).into_iter().collect()
    }

    fn rendered_box(&self, node_id: NodeId) -> Option<DomRect> {
        if self.is_rendered(node_id) {
            self.layout_box(node_id)
        } else {
            None
        }
    }

    pub fn scroll_metrics(&self, node_id: NodeId) -> ScrollMetrics {
        self.arena()
            .get(node_id)
            .map(|n| n.scroll)
            .unwrap_or_default()
    }

    /// Declare the scrollable content size of an element
    pub fn set_scroll_size(&mut self, node_id: NodeId, width: f64, height: f64) -> Result<()> {
        let node = self.arena_mut().element_mut(node_id)?;
        node.scroll.width = width;
        node.scroll.height = height;
        Ok(())
    }

    /// `scrollHeight`: content height, never less than the box; zero when not rendered
    pub fn scroll_height(&self, node_id: NodeId) -> f64 {
        match self.rendered_box(node_id) {
            Some(rect) => self.scroll_metrics(node_id).height.max(rect.height),
            None if self.is_rendered(node_id) => self.scroll_metrics(node_id).height,
            None => 0.0,
        }
    }

    /// `scrollWidth`, same rules as [`Document::scroll_height`]
    pub fn scroll_width(&self, node_id: NodeId) -> f64 {
        match self.rendered_box(node_id) {
            Some(rect) => self.scroll_metrics(node_id).width.max(rect.width),
            None if self.is_rendered(node_id) => self.scroll_metrics(node_id).width,
            None => 0.0,
        }
    }

    pub fn scroll_top(&self, node_id: NodeId) -> f64 {
        self.scroll_metrics(node_id).top
    }

    pub fn scroll_left(&self, node_id: NodeId) -> f64 {
        self.scroll_metrics(node_id).left
    }

    /// Set `scrollTop`, clamped to the scrollable range
    pub fn set_scroll_top(&mut self, node_id: NodeId, value: f64) -> Result<()> {
        let max = (self.scroll_height(node_id) - self.offset_height(node_id)).max(0.0);
        self.arena_mut().element_mut(node_id)?.scroll.top = clamp_scroll(value, max);
        Ok(())
    }

    /// Set `scrollLeft`, clamped to the scrollable range
    pub fn set_scroll_left(&mut self, node_id: NodeId, value: f64) -> Result<()> {
        let max = (self.scroll_width(node_id) - self.offset_width(node_id)).max(0.0);
        self.arena_mut().element_mut(node_id)?.scroll.left = clamp_scroll(value, max);
        Ok(())
    }
}

fn clamp_scroll(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

fn initial_display(node: &DomNode) -> &'static str {
    let tag = node.node_name.as_str();
    if node.has_attr("hidden") || HIDDEN_ELEMENTS.contains(&tag) {
        return "none";
    }
    if BLOCK_ELEMENTS.contains(&tag) {
        return "block";
    }
    match tag {
        "li" => "list-item",
        "table" => "table",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "thead" => "table-header-group",
        "tbody" => "table-row-group",
        "tfoot" => "table-footer-group",
        "input" | "button" | "select" | "textarea" | "img" => "inline-block",
        _ => "inline",
    }
}

/// Colors compute to `rgb()`/`rgba()`; everything else is reported as specified
fn normalize_computed(name: &str, value: String) -> String {
    if !is_custom_property(name) && name.ends_with("color") {
        if let Some(color) = parse_color(&value) {
            return color.to_string();
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse(
            r#"<html><head><style>
                .box { max-height: 0px; color: navy }
                #panel.box { max-height: 50px }
                .plain { --gap: 4px }
            </style></head><body>
              <div id="panel" class="box plain"><span id="inner">t</span></div>
              <p id="para" hidden>p</p>
            </body></html>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cascade_order() {
        let mut doc = doc();
        let panel = doc.get_element_by_id("panel").unwrap();
        assert_eq!(doc.computed_style(panel, "maxHeight"), "50px");

        doc.arena_mut()
            .get_mut(panel)
            .unwrap()
            .set_style_property("max-height", "10px");
        assert_eq!(doc.computed_style(panel, "max-height"), "10px");
        assert_eq!(doc.computed_style(panel, "opacity"), "1");
    }

    #[test]
    fn test_added_rules_and_specificity() {
        let mut doc = doc();
        let panel = doc.get_element_by_id("panel").unwrap();
        doc.add_style_rule("div", "opacity: 0.2").unwrap();
        assert_eq!(doc.computed_style(panel, "opacity"), "0.2");

        doc.add_style_rule(".box", "max-height: 5px").unwrap();
        assert_eq!(doc.computed_style(panel, "max-height"), "50px");
        doc.add_style_rule("#panel.box.plain", "max-height: 7px").unwrap();
        assert_eq!(doc.computed_style(panel, "max-height"), "7px");
        assert!(doc.add_style_rule("div[", "color: red").is_err());
    }

    #[test]
    fn test_inheritance() {
        let doc = doc();
        let inner = doc.get_element_by_id("inner").unwrap();
        assert_eq!(doc.computed_style(inner, "color"), "rgb(0, 0, 128)");
        assert_eq!(doc.computed_style(inner, "--gap"), "4px");
        assert_eq!(doc.computed_style(inner, "--missing"), "");
        assert_eq!(doc.computed_style(inner, "max-height"), "none");
    }

    #[test]
    fn test_display_and_geometry() {
        let mut doc = doc();
        let panel = doc.get_element_by_id("panel").unwrap();
        let inner = doc.get_element_by_id("inner").unwrap();
        let para = doc.get_element_by_id("para").unwrap();

        assert_eq!(doc.computed_style(panel, "display"), "block");
        assert_eq!(doc.computed_style(inner, "display"), "inline");
        assert_eq!(doc.computed_style(para, "display"), "none");

        doc.set_layout(panel, DomRect::new(0.0, 10.0, 200.0, 40.0)).unwrap();
        doc.set_layout(inner, DomRect::new(0.0, 10.0, 20.0, 10.0)).unwrap();
        assert_eq!(doc.offset_width(panel), 200.0);
        assert_eq!(doc.computed_style(panel, "width"), "200px");
        assert_eq!(doc.client_rects(inner).len(), 1);

        doc.arena_mut()
            .get_mut(panel)
            .unwrap()
            .set_style_property("display", "none");
        assert_eq!(doc.offset_width(panel), 0.0);
        assert!(!doc.is_rendered(inner));
        assert!(doc.client_rects(inner).is_empty());
        assert_eq!(doc.computed_style(panel, "width"), "auto");
    }

    #[test]
    fn test_scroll_clamping() {
        let mut doc = doc();
        let panel = doc.get_element_by_id("panel").unwrap();
        doc.set_layout(panel, DomRect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        doc.set_scroll_size(panel, 100.0, 300.0).unwrap();

        doc.set_scroll_top(panel, 150.0).unwrap();
        assert_eq!(doc.scroll_top(panel), 150.0);
        doc.set_scroll_top(panel, 1000.0).unwrap();
        assert_eq!(doc.scroll_top(panel), 200.0);
        doc.set_scroll_top(panel, -5.0).unwrap();
        assert_eq!(doc.scroll_top(panel), 0.0);
        assert_eq!(doc.scroll_height(panel), 300.0);
    }
}
