//! Live preview scheduling.
//!
//! Edits arrive in bursts. [`PreviewScheduler`] holds a single pending slot:
//! every request pushes the deadline out by the quiet period, and a render
//! fires only once the editor has been idle that long. [`PreviewManager`]
//! stamps every render with a generation so that a slow render finishing
//! after a newer one is dropped instead of replacing fresher output.
//!
//! Time is passed in by the caller, which keeps both types deterministic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::document::DocumentData;
use crate::error::Result;
use crate::pipeline::{generate_pdf, PipelineConfig};

/// Quiet period between the last edit and the preview render.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Single-slot debounce timer.
#[derive(Debug, Clone)]
pub struct PreviewScheduler {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for PreviewScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl PreviewScheduler {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Schedule a render, replacing any pending one.
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per quiet period, when the pending render is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Identifies one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// A finished preview.
#[derive(Debug)]
pub struct PreviewHandle {
    pub generation: u64,
    pub pdf: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug, Default)]
pub struct PreviewManager {
    scheduler: PreviewScheduler,
    issued: u64,
    current: Option<Arc<PreviewHandle>>,
}

impl PreviewManager {
    pub fn new(quiet: Duration) -> Self {
        Self {
            scheduler: PreviewScheduler::new(quiet),
            ..Self::default()
        }
    }

    /// Record an edit.
    pub fn on_edit(&mut self, now: Instant) {
        self.scheduler.request(now);
    }

    /// Start a render; later tickets supersede earlier ones.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Install the result of a render unless a newer render was started
    /// in the meantime. Returns whether the result was kept.
    pub fn complete(&mut self, ticket: Ticket, pdf: Vec<u8>, page_count: usize) -> bool {
        if ticket.0 != self.issued {
            log::debug!(
                "discarding stale preview {} (latest is {})",
                ticket.0,
                self.issued
            );
            return false;
        }
        // Replacing the Arc releases this manager's hold on the old preview.
        self.current = Some(Arc::new(PreviewHandle {
            generation: ticket.0,
            pdf,
            page_count,
        }));
        true
    }

    pub fn current(&self) -> Option<Arc<PreviewHandle>> {
        self.current.clone()
    }

    /// Render `doc` synchronously under a fresh ticket.
    pub fn render_now(&mut self, doc: &DocumentData, config: &PipelineConfig) -> Result<bool> {
        let ticket = self.begin();
        let (pdf, layout) = generate_pdf(doc, config)?;
        Ok(self.complete(ticket, pdf, layout.page_count()))
    }

    /// Render if the debounce period has elapsed; returns the new preview
    /// when one was produced.
    pub fn tick(
        &mut self,
        now: Instant,
        doc: &DocumentData,
        config: &PipelineConfig,
    ) -> Result<Option<Arc<PreviewHandle>>> {
        if !self.scheduler.poll(now) {
            return Ok(None);
        }
        if self.render_now(doc, config)? {
            Ok(self.current())
        } else {
            Ok(None)
        }
    }
}
