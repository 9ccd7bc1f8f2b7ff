//! Producer/consumer frame handoff
//!
//! One thread delivers frames, one thread paints. The current frame and the
//! render state sit behind a single pixel lock that is held only while
//! frame state is touched. Deferred tasks are queued from any thread and
//! drained by the painter outside the lock.

use crate::types::Frame;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

/// Where the handoff is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    /// Nothing new since the last paint
    #[default]
    Idle,
    /// A frame was stored and not painted yet
    FrameReady,
    /// The painter holds the pixel lock
    Painting,
}

/// Work to run after the next paint
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Default)]
struct FrameSlot {
    frame: Option<Arc<Frame>>,
    state: RenderState,
}

/// Single-slot frame cell plus deferred task queue
pub struct RenderSync {
    slot: Mutex<FrameSlot>,
    tasks_tx: Sender<Task>,
    tasks_rx: Receiver<Task>,
}

impl RenderSync {
    pub fn new() -> Self {
        let (tasks_tx, tasks_rx) = crossbeam_channel::unbounded();
        Self {
            slot: Mutex::new(FrameSlot::default()),
            tasks_tx,
            tasks_rx,
        }
    }

    pub fn state(&self) -> RenderState {
        self.slot.lock().state
    }

    /// Replace the current frame; the most recent frame wins
    pub fn store(&self, frame: Option<Arc<Frame>>) {
        let mut slot = self.slot.lock();
        slot.state = if frame.is_some() {
            RenderState::FrameReady
        } else {
            RenderState::Idle
        };
        slot.frame = frame;
    }

    /// Run `prepare` under the pixel lock, then store `frame` if it succeeded
    ///
    /// A paint sees either the old frame with the old pixel state or the new
    /// frame with everything `prepare` changed, never a mix.
    pub fn store_with<E>(
        &self,
        frame: Arc<Frame>,
        prepare: impl FnOnce() -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        let mut slot = self.slot.lock();
        prepare()?;
        slot.frame = Some(frame);
        slot.state = RenderState::FrameReady;
        Ok(())
    }

    /// Run `update` under the pixel lock without touching the frame
    pub fn with_pixels_locked<R>(&self, update: impl FnOnce() -> R) -> R {
        let _slot = self.slot.lock();
        update()
    }

    pub fn current_frame(&self) -> Option<Arc<Frame>> {
        self.slot.lock().frame.clone()
    }

    /// Run `draw` with the pixel lock held
    ///
    /// `draw` sees the current frame; no `store` can interleave with it.
    pub fn paint_locked<R>(&self, draw: impl FnOnce(Option<&Frame>) -> R) -> R {
        let mut slot = self.slot.lock();
        slot.state = RenderState::Painting;
        let out = draw(slot.frame.as_deref());
        slot.state = RenderState::Idle;
        out
    }

    /// Queue work for after the next paint
    pub fn post_task(&self, task: Task) {
        // Both ends live in `self`, the channel cannot be disconnected
        let _ = self.tasks_tx.send(task);
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks_rx.len()
    }

    /// Run the tasks queued so far, returns how many ran
    ///
    /// Tasks posted while draining wait for the next paint.
    pub fn drain_tasks(&self) -> usize {
        let queued = self.tasks_rx.len();
        let mut count = 0;
        for task in self.tasks_rx.try_iter().take(queued) {
            task();
            count += 1;
        }
        count
    }
}

impl Default for RenderSync {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSync")
            .field("state", &self.state())
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}
