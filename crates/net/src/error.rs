//! Network helper errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("Request failed with status {status}")]
    Status { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Could not encode request data: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

impl NetError {
    /// HTTP status for [`NetError::Status`]
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetError {
    fn from(e: reqwest::Error) -> Self {
        NetError::Transport(e.to_string())
    }
}

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetError>;
