//! Animated effects: fades, slides, numeric and color tweens, scrolling
//!
//! Each call returns an [`Animation`] covering every node it started a
//! loop for. Durations default to the values in [`QueryConfig`].
//!
//! [`QueryConfig`]: crate::QueryConfig

use dom::style::{normalize_property_name, parse_leading_float, split_numeric};
use dom::{parse_color, CssValue, NodeId, Rgba, Window};
use std::time::Duration;

use super::Selection;
use crate::animation::{Animation, OnComplete, Tween};

fn set_style(window: &Window, node: NodeId, property: &str, value: &str) {
    let mut document = window.document_mut();
    if let Ok(element) = document.arena_mut().element_mut(node) {
        element.set_style_property(property, value);
    }
}

fn hide_on_complete() -> Option<OnComplete> {
    Some(Box::new(|window: &Window, node: NodeId| {
        set_style(window, node, "display", "none")
    }))
}

fn color_channels(value: &str) -> [u8; 3] {
    parse_color(value).unwrap_or(Rgba::WHITE).channels()
}

impl Selection {
    pub fn fade_in(&self) -> Animation {
        self.fade_in_for(self.config().fade_duration)
    }

    /// Show every node at opacity 0 and tween opacity to 1
    pub fn fade_in_for(&self, duration: Duration) -> Animation {
        let animation = Animation::new(self.clone());
        let display = self.config().default_display.clone();
        for &node in &self.nodes {
            if !self.window.document().arena().is_element(node) {
                continue;
            }
            set_style(&self.window, node, "opacity", "0");
            set_style(&self.window, node, "display", &display);
            let tween = Tween::Style {
                property: "opacity".to_string(),
                from: 0.0,
                to: 1.0,
                unit: String::new(),
            };
            animation.run(node, vec![tween], duration, None);
        }
        tracing::debug!("fade_in on {} nodes", self.nodes.len());
        animation
    }

    pub fn fade_out(&self) -> Animation {
        self.fade_out_for(self.config().fade_duration)
    }

    /// Tween opacity from its computed value to 0, then hide
    pub fn fade_out_for(&self, duration: Duration) -> Animation {
        let animation = Animation::new(self.clone());
        for &node in &self.nodes {
            let from = {
                let document = self.window.document();
                if !document.arena().is_element(node) {
                    continue;
                }
                parse_leading_float(&document.computed_style(node, "opacity")).unwrap_or(1.0)
            };
            let tween = Tween::Style {
                property: "opacity".to_string(),
                from,
                to: 0.0,
                unit: String::new(),
            };
            animation.run(node, vec![tween], duration, hide_on_complete());
        }
        tracing::debug!("fade_out on {} nodes", self.nodes.len());
        animation
    }

    pub fn slide_toggle(&self) -> Animation {
        self.slide_toggle_for(self.config().slide_duration)
    }

    /// Expand nodes collapsed to `max-height: 0px`, collapse all others
    ///
    /// Expanding shows the node and tweens `max-height` up to its scroll
    /// height. Collapsing tweens down to `0px` and then hides the node.
    pub fn slide_toggle_for(&self, duration: Duration) -> Animation {
        let animation = Animation::new(self.clone());
        let display = self.config().default_display.clone();
        for &node in &self.nodes {
            let collapsed = {
                let document = self.window.document();
                if !document.arena().is_element(node) {
                    continue;
                }
                document.computed_style(node, "max-height") == "0px"
            };
            set_style(&self.window, node, "overflow", "hidden");

            let (from, to, on_complete) = if collapsed {
                set_style(&self.window, node, "display", &display);
                let target = self.window.document().scroll_height(node);
                (0.0, target, None)
            } else {
                let document = self.window.document();
                let current = match split_numeric(&document.computed_style(node, "max-height")) {
                    Some((value, "px")) => value,
                    _ => document.scroll_height(node).max(document.offset_height(node)),
                };
                (current, 0.0, hide_on_complete())
            };
            let tween = Tween::Style {
                property: "max-height".to_string(),
                from,
                to,
                unit: "px".to_string(),
            };
            animation.run(node, vec![tween], duration, on_complete);
        }
        animation
    }

    pub fn animate<K, V>(&self, styles: impl IntoIterator<Item = (K, V)>) -> Animation
    where
        K: AsRef<str>,
        V: Into<CssValue>,
    {
        self.animate_for(styles, self.config().animate_duration)
    }

    /// Tween numeric style properties from their computed values
    ///
    /// The unit comes from the computed start value. Properties whose
    /// start is not a plain number with a unit, or whose target has no
    /// leading number, are skipped.
    pub fn animate_for<K, V>(
        &self,
        styles: impl IntoIterator<Item = (K, V)>,
        duration: Duration,
    ) -> Animation
    where
        K: AsRef<str>,
        V: Into<CssValue>,
    {
        let styles: Vec<(String, String)> = styles
            .into_iter()
            .map(|(property, value)| {
                (
                    normalize_property_name(property.as_ref()),
                    value.into().to_css_string(),
                )
            })
            .collect();

        let animation = Animation::new(self.clone());
        for &node in &self.nodes {
            let tweens: Vec<Tween> = {
                let document = self.window.document();
                styles
                    .iter()
                    .filter_map(|(property, target)| {
                        let computed = document.computed_style(node, property);
                        let Some((from, unit)) = split_numeric(&computed) else {
                            tracing::debug!("Not animating '{}' from '{}'", property, computed);
                            return None;
                        };
                        let to = parse_leading_float(target)?;
                        Some(Tween::Style {
                            property: property.clone(),
                            from,
                            to,
                            unit: unit.to_string(),
                        })
                    })
                    .collect()
            };
            animation.run(node, tweens, duration, None);
        }
        animation
    }

    /// Tween a color property (default `background-color`) to a color (default white)
    pub fn color_animate(&self, property: Option<&str>, to: Option<&str>) -> Animation {
        self.color_animate_for(property, to, self.config().color_duration)
    }

    /// Unparseable start or end colors are treated as white
    pub fn color_animate_for(
        &self,
        property: Option<&str>,
        to: Option<&str>,
        duration: Duration,
    ) -> Animation {
        let config = self.config();
        let property = normalize_property_name(property.unwrap_or(&config.color_property));
        let to = color_channels(to.unwrap_or(&config.color_target));

        let animation = Animation::new(self.clone());
        for &node in &self.nodes {
            let from = {
                let document = self.window.document();
                if !document.arena().is_element(node) {
                    continue;
                }
                color_channels(&document.computed_style(node, &property))
            };
            let tween = Tween::Color {
                property: property.clone(),
                from,
                to,
            };
            animation.run(node, vec![tween], duration, None);
        }
        animation
    }

    pub fn scroll_to(&self) -> Animation {
        self.scroll_to_for(self.config().scroll_duration)
    }

    /// Scroll the window so a node's top edge is at the viewport top
    ///
    /// Every node starts its own scroll from the current offset. They all
    /// claim the window scroll, so the last node's target wins.
    pub fn scroll_to_for(&self, duration: Duration) -> Animation {
        let animation = Animation::new(self.clone());
        let from = self.window.scroll_y();
        let document_id = self.window.document().document_id();
        for &node in &self.nodes {
            if !self.window.document().arena().is_element(node) {
                continue;
            }
            let to = self.window.bounding_client_rect(node).y + from;
            tracing::debug!("Scrolling window from {} to {} for node {}", from, to, node);
            animation.run(
                document_id,
                vec![Tween::WindowScroll { from, to }],
                duration,
                None,
            );
        }
        animation
    }
}
