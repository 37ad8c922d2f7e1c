//! Course page DOM: an arena tree built by html5ever, CSS selector matching,
//! text extraction and the [`Fragment`] query trait.

mod arena;
mod fragment;
mod select;
mod text;
mod tree_sink;

pub use arena::{Attr, Element, Node, NodeArena, NodeId, NodeKind};
pub use fragment::{Fragment, HtmlFragment, Snapshot};
pub use select::{CompiledSelector, compile};
pub use text::{collapse_whitespace, inner_html, inner_text, outer_html, text_content};
pub use tree_sink::parse_html;
