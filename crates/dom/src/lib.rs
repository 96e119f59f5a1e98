//! Host document model
//!
//! An arena-backed document tree with just enough of a browser around it
//! for page scripts to run against: selectors, HTML parsing and
//! serialization, inline and computed style, color normalization, events,
//! and a window with a virtual clock.
//!
//! ## Core Design
//!
//! ```text
//! HTML → html5ever → DomArena (Vec<DomNode>, NodeId = u32)
//!                        ↑
//!        Document (stylesheet, listeners) ← Window (clock, frames, timers, location)
//! ```
//!
//! Everything is single-threaded. `Window` is a cheap `Rc` handle; the
//! document sits behind a `RefCell` and is never borrowed while callbacks run.

pub mod arena;
pub mod classlist;
pub mod color;
mod computed;
pub mod document;
pub mod error;
pub mod events;
pub mod parser;
mod props;
pub mod scheduler;
pub mod selector;
pub mod serializer;
pub mod style;
pub mod types;
pub mod utils;
pub mod window;

pub use arena::DomArena;
pub use classlist::TokenList;
pub use color::{parse_color, Rgba};
pub use document::Document;
pub use error::{DomError, Result};
pub use events::{Event, Listener};
pub use scheduler::{FrameId, TimerId};
pub use selector::SelectorList;
pub use style::{CssValue, InlineStyle};
pub use types::*;
pub use window::{Location, ReadyState, Window, WindowConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_page_end_to_end() {
        let window = Window::from_html(
            "<body><ul id=list><li>a</li><li class=on>b</li></ul></body>",
            WindowConfig::default(),
        )
        .unwrap();

        let doc = window.document();
        let items = doc.query_selector_all("#list > li").unwrap();
        assert_eq!(items.len(), 2);
        assert!(doc.matches(items[1], "li.on:last-child").unwrap());
        assert_eq!(doc.outer_html(items[0]).unwrap(), "<li>a</li>");
    }
}
