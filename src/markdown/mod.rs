//! Markdown generation.
//!
//! - `convert`: HTML fragment → Markdown, the converter every block body goes
//!   through
//! - `compose`: the small constructs block renderers are assembled from
//!   (headings, bullet/numbered items with hanging indents, link callouts,
//!   images, fenced code, pipe tables)
//! - `slug`: GitHub-style anchors for the generated index
//! - `plain`: Markdown → plain text for the `.txt` output
//!
//! Everything here is pure string transformation; asset materialization and
//! file output live in [`crate::asset`] and [`crate::export`].

mod compose;
mod convert;
mod escape;
mod plain;
mod slug;

pub use compose::{bullet_item, code_block, heading, image, link_callout, numbered_item, table};
pub use convert::html_to_markdown;
pub use escape::{escape_inline_code, escape_table_cell, fence_length};
pub use plain::markdown_to_plain;
pub use slug::{SlugRegistry, slugify};
