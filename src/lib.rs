//! notetoc — clickable table of contents for Markdown notes.
//!
//! The core is [`outline`]: header lines are scanned out of the document
//! and each one gets a URL-safe slug, unique within the document. The first
//! header with a given slug keeps it plain; later ones get `-2`, `-3`, …
//! in document order. Every pass starts from an empty collision table, so
//! numbering never leaks from one note into another.
//!
//! ```
//! use notetoc::outline::build_outline;
//!
//! let toc = build_outline("# Title\n## Sub\ntext\n## Sub");
//! let slugs: Vec<&str> = toc.iter().map(|e| e.slug.as_str()).collect();
//! assert_eq!(slugs, ["title", "sub", "sub-2"]);
//! ```
//!
//! Around the core sit the pieces a host needs: [`host::TocPanel`] turns
//! selection/content notifications into passes and resolves clicks,
//! [`render`] produces escaped panel HTML, [`watch`] drives a panel from
//! filesystem events and [`mcp`] exposes it over JSON-RPC stdio.

pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod mcp;
pub mod outline;
pub mod read;
pub mod render;
pub mod watch;

pub use config::Config;
pub use error::TocError;
pub use outline::{build_outline, OutlineBuilder, OutlineEntry, Toc};
