//! Panel controller: turns host notifications into outline passes.
//!
//! The host hands us the selected document on demand and tells us when the
//! selection or its content changed. Every event is one full recompute. Passes
//! are serialized on the builder lock; a pass that has been overtaken by a
//! newer event is dropped instead of rendered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TocError;
use crate::outline::{OutlineBuilder, Toc};
use crate::render::SCROLL_MESSAGE;

/// The currently selected document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub body: String,
}

/// Supplies the selected document, or `None` when nothing is selected.
pub trait DocumentSource {
    fn selected(&self) -> Result<Option<Document>, TocError>;
}

/// What the display surface should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    Loading,
    Toc(Toc),
}

/// Receives every view the panel produces.
pub trait RenderTarget {
    fn render(&self, view: &PanelView);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocEvent {
    SelectionChanged,
    ContentChanged,
}

/// Posted by the display surface when an entry is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationMessage {
    pub name: String,
    pub hash: String,
}

impl NavigationMessage {
    pub fn scroll_to(slug: impl Into<String>) -> Self {
        Self {
            name: SCROLL_MESSAGE.to_string(),
            hash: slug.into(),
        }
    }
}

/// Where the host should scroll the document view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollTarget {
    pub slug: String,
    pub line: u32,
}

pub struct TocPanel<S, R> {
    source: S,
    target: R,
    builder: Mutex<OutlineBuilder>,
    generation: AtomicU64,
    current: Mutex<Option<Toc>>,
}

impl<S: DocumentSource, R: RenderTarget> TocPanel<S, R> {
    pub fn new(source: S, target: R) -> Self {
        Self {
            source,
            target,
            builder: Mutex::new(OutlineBuilder::new()),
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    /// Show the placeholder, then run the initial pass.
    pub fn start(&self) {
        self.target.render(&PanelView::Loading);
        self.handle(TocEvent::SelectionChanged);
    }

    /// Run one pass for `event`. Returns the rendered toc, or `None` when the
    /// pass was superseded or the document source failed.
    pub fn handle(&self, event: TocEvent) -> Option<Toc> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut builder = match self.builder.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.superseded(ticket) {
            debug!(?event, ticket, "pass superseded before start");
            return None;
        }

        let document = match self.source.selected() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(?event, error = %e, "document source failed");
                return None;
            }
        };

        let toc = Toc::from_document(document.as_ref().map(|d| d.body.as_str()), &mut builder);
        if self.superseded(ticket) {
            debug!(?event, ticket, "pass superseded before render");
            return None;
        }

        debug!(
            ?event,
            document = document.as_ref().map(|d| d.id.as_str()),
            headers = toc.entries().len(),
            "rendering outline"
        );
        self.target.render(&PanelView::Toc(toc.clone()));
        *self.lock_current() = Some(toc.clone());
        Some(toc)
    }

    /// Resolve a click from the display surface. Unknown message names and
    /// slugs that no longer exist are ignored.
    pub fn navigate(&self, msg: &NavigationMessage) -> Option<ScrollTarget> {
        if msg.name != SCROLL_MESSAGE {
            debug!(name = %msg.name, "ignoring unknown panel message");
            return None;
        }
        let current = self.lock_current();
        let target = current
            .as_ref()
            .and_then(|toc| toc.find(&msg.hash))
            .map(|entry| ScrollTarget {
                slug: entry.slug.clone(),
                line: entry.line,
            });
        if target.is_none() {
            debug!(slug = %msg.hash, "stale slug, nothing to scroll to");
        }
        target
    }

    /// Number of events received so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The last toc that was rendered, if any.
    pub fn current(&self) -> Option<Toc> {
        self.lock_current().clone()
    }

    fn superseded(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<Toc>> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
