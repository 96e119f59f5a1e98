use serde::{Deserialize, Serialize};

/// Client-wide request defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Value of the `X-Requested-With` header sent with every request
    pub requested_with: String,
    /// `Content-Type` used by `ajax` when the caller gives none
    pub default_content_type: String,
    pub user_agent: String,
    /// Base for relative request URLs; without one they are rejected
    pub base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requested_with: "XMLHttpRequest".to_string(),
            default_content_type: "application/x-www-form-urlencoded".to_string(),
            user_agent: concat!("miniquery-net/", env!("CARGO_PKG_VERSION")).to_string(),
            base_url: None,
        }
    }
}
