//! Chainable selection wrapper over the `dom` host model
//!
//! ```text
//! MiniQuery (window + shared context)
//!     └── select(target) → Selection (ordered NodeIds)
//!             ├── reads: first node → Option<_>
//!             ├── writes: every node → &Self
//!             ├── derivations → Selection
//!             └── effects → Animation (cancellable, one frame loop per node)
//! ```
//!
//! There is no global: construct a [`MiniQuery`] for a [`dom::Window`] and
//! select through it.

pub mod animation;
pub mod bootstrap;
pub mod config;
pub mod selection;
pub mod target;

pub use animation::Animation;
pub use bootstrap::MiniQuery;
pub use config::QueryConfig;
pub use selection::{Content, FormEntry, FormObject, FormValue, Length, Selection};
pub use target::Target;

use dom::{Event, Listener};
use std::rc::Rc;

/// Wrap a closure as an event listener for [`Selection::on`]/[`Selection::off`]
pub fn listener(f: impl Fn(&Event) + 'static) -> Listener {
    Rc::new(f)
}
