pub mod markdown;
pub mod slug;

use serde::Serialize;

pub use markdown::{extract, HeaderRecord};
pub use slug::{slugify_base, CollisionTable, SlugGenerator};

/// One row of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub level: usize,
    /// Raw header text. Escaping is the renderer's job.
    pub text: String,
    pub slug: String,
    /// Zero-based position among the document's headers.
    pub order: usize,
    /// 1-based source line of the header.
    pub line: u32,
}

/// What the panel shows: either nothing is selected, or the outline of the
/// selected document (which may legitimately be empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Toc {
    NoDocument,
    Ready { entries: Vec<OutlineEntry> },
}

impl Toc {
    pub fn from_document(body: Option<&str>, builder: &mut OutlineBuilder) -> Self {
        match body {
            Some(text) => Toc::Ready {
                entries: builder.build(text),
            },
            None => Toc::NoDocument,
        }
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        match self {
            Toc::Ready { entries } => entries,
            Toc::NoDocument => &[],
        }
    }

    /// Look up the entry a navigation slug points at. Stale slugs give `None`.
    pub fn find(&self, slug: &str) -> Option<&OutlineEntry> {
        self.entries().iter().find(|e| e.slug == slug)
    }
}

/// Builds outlines, one full pass per call. Owns the slug collision table,
/// which is reset at the start of every pass.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    slugs: SlugGenerator,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, text: &str) -> Vec<OutlineEntry> {
        self.slugs.reset();
        debug_assert!(self.slugs.table().is_empty());
        let entries: Vec<OutlineEntry> = extract(text)
            .into_iter()
            .enumerate()
            .map(|(order, header)| OutlineEntry {
                slug: self.slugs.slugify(&header.text),
                level: header.level,
                text: header.text,
                order,
                line: header.line,
            })
            .collect();
        tracing::debug!(headers = entries.len(), "outline pass");
        entries
    }
}

/// One-shot outline with a fresh builder.
pub fn build_outline(text: &str) -> Vec<OutlineEntry> {
    OutlineBuilder::new().build(text)
}
