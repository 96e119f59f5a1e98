//! Selection wrapper configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults used when an operation is called without explicit arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// `display` value written by `show`, `fade_in` and the visibility toggle
    pub default_display: String,
    pub fade_duration: Duration,
    pub slide_duration: Duration,
    pub animate_duration: Duration,
    pub color_duration: Duration,
    pub scroll_duration: Duration,
    /// Property animated by `color_animate` when none is given
    pub color_property: String,
    /// Target color of `color_animate` when none is given
    pub color_target: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_display: "block".to_string(),
            fade_duration: Duration::from_millis(300),
            slide_duration: Duration::from_millis(300),
            animate_duration: Duration::from_millis(400),
            color_duration: Duration::from_millis(400),
            scroll_duration: Duration::from_millis(500),
            color_property: "background-color".to_string(),
            color_target: "#ffffff".to_string(),
        }
    }
}
