//! Network helpers
//!
//! `ajax` for configurable requests that report failures through a
//! callback, plus `get`/`post` shorthands that return `Result`. The wire is
//! behind the [`Transport`] trait; [`HttpTransport`] uses `reqwest`.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{NetError, Result};
pub use request::{RequestDescriptor, ResponseBody, ResponseType};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
