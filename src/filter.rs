//! Post-processing filter chain
//!
//! Generic filters run first, in insertion order. The subtitle and OSD
//! slots always run after them, in the order they were first set.
//!
//! The chain never owns its filters: it keeps `Weak` handles and a filter
//! whose last `Arc` was dropped is skipped and reported. A stage that
//! returns an error or panics is counted as failed and the rest still run.

use crate::error::Result;
use crate::types::{Rect, RenderStats, Size};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

/// Rendering context handed to every filter stage
#[derive(Debug, Clone, Default)]
pub struct FilterContext {
    /// Surface region the frame was drawn into
    pub video_rect: Rect,
    /// Full surface size
    pub surface: Size,
    /// Source frame size
    pub frame: Size,
    /// Presentation timestamp of the painted frame
    pub pts: Option<i64>,
}

/// A post-processing stage
pub trait Filter: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str {
        "filter"
    }

    /// Process the composited output
    fn process(&self, context: &FilterContext, stats: &RenderStats) -> Result<()>;
}

/// Reserved overlay positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterSlot {
    Subtitle,
    Osd,
}

/// Outcome of one [`FilterChain::apply`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainReport {
    /// Stages that ran successfully
    pub processed: usize,
    /// Stages whose filter was already dropped
    pub skipped: usize,
    /// Stages that returned an error
    pub failed: usize,
}

type FilterRef = Weak<dyn Filter>;

fn same(a: &FilterRef, b: &Arc<dyn Filter>) -> bool {
    Weak::ptr_eq(a, &Arc::downgrade(b))
}

/// Ordered filter container with named overlay slots
#[derive(Default)]
pub struct FilterChain {
    generic: Vec<FilterRef>,
    named: Vec<(FilterSlot, FilterRef)>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, dropped filters included
    pub fn len(&self) -> usize {
        self.generic.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a generic filter; it still runs before every named slot
    pub fn append(&mut self, filter: &Arc<dyn Filter>) {
        tracing::debug!("Filter '{}' appended", filter.name());
        self.generic.push(Arc::downgrade(filter));
    }

    /// Remove the last occurrence of a generic filter
    pub fn remove(&mut self, filter: &Arc<dyn Filter>) -> bool {
        match self.generic.iter().rposition(|f| same(f, filter)) {
            Some(idx) => {
                self.generic.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Filter currently in `slot`, if set and still alive
    pub fn slot(&self, slot: FilterSlot) -> Option<Arc<dyn Filter>> {
        self.named
            .iter()
            .find(|(s, _)| *s == slot)
            .and_then(|(_, f)| f.upgrade())
    }

    pub fn subtitle_filter(&self) -> Option<Arc<dyn Filter>> {
        self.slot(FilterSlot::Subtitle)
    }

    pub fn osd_filter(&self) -> Option<Arc<dyn Filter>> {
        self.slot(FilterSlot::Osd)
    }

    /// Set or clear a named slot and return what it held before
    ///
    /// Replacing keeps the slot's position, clearing removes it, and
    /// setting a previously empty slot appends it to the tail.
    pub fn set_slot(
        &mut self,
        slot: FilterSlot,
        filter: Option<&Arc<dyn Filter>>,
    ) -> Option<Arc<dyn Filter>> {
        let idx = self.named.iter().rposition(|(s, _)| *s == slot);
        let old = idx.and_then(|i| self.named[i].1.upgrade());

        match (idx, filter) {
            (Some(i), Some(new)) => {
                if same(&self.named[i].1, new) {
                    return old;
                }
                tracing::debug!("{:?} filter replaced by '{}'", slot, new.name());
                self.named[i].1 = Arc::downgrade(new);
            }
            (Some(i), None) => {
                tracing::debug!("{:?} filter disabled", slot);
                self.named.remove(i);
            }
            (None, Some(new)) => {
                tracing::debug!("{:?} filter set to '{}'", slot, new.name());
                self.named.push((slot, Arc::downgrade(new)));
            }
            (None, None) => {}
        }
        old
    }

    pub fn set_subtitle_filter(
        &mut self,
        filter: Option<&Arc<dyn Filter>>,
    ) -> Option<Arc<dyn Filter>> {
        self.set_slot(FilterSlot::Subtitle, filter)
    }

    pub fn set_osd_filter(&mut self, filter: Option<&Arc<dyn Filter>>) -> Option<Arc<dyn Filter>> {
        self.set_slot(FilterSlot::Osd, filter)
    }

    /// Live filters in execution order; `None` marks a dropped entry
    pub fn snapshot(&self) -> Vec<Option<Arc<dyn Filter>>> {
        self.generic
            .iter()
            .chain(self.named.iter().map(|(_, f)| f))
            .map(Weak::upgrade)
            .collect()
    }

    /// Run every stage in order
    pub fn apply(&self, context: &FilterContext, stats: &RenderStats) -> ChainReport {
        run_stages(&self.snapshot(), context, stats)
    }
}

/// Run a snapshot of stages, isolating each one
pub(crate) fn run_stages(
    stages: &[Option<Arc<dyn Filter>>],
    context: &FilterContext,
    stats: &RenderStats,
) -> ChainReport {
    let mut report = ChainReport::default();
    for stage in stages {
        let Some(filter) = stage else {
            tracing::warn!("Skipping a dropped filter");
            report.skipped += 1;
            continue;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| filter.process(context, stats))) {
            Ok(Ok(())) => report.processed += 1,
            Ok(Err(e)) => {
                tracing::warn!("Filter '{}' failed: {}", filter.name(), e);
                report.failed += 1;
            }
            Err(_) => {
                tracing::error!("Filter '{}' panicked", filter.name());
                report.failed += 1;
            }
        }
    }
    report
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("generic", &self.generic.len())
            .field(
                "named",
                &self.named.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
            )
            .finish()
    }
}
