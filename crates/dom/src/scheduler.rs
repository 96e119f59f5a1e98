//! Animation-frame and timer bookkeeping
//!
//! Pure data structures: nothing here runs callbacks. The window takes
//! due work out, releases its borrows, and only then invokes it, so
//! callbacks are free to schedule or cancel more work.

use ahash::AHashSet;

/// Handle returned by `request_animation_frame` / `start_frame_loop`
pub type FrameId = u64;

/// Handle returned by `set_timeout`
pub type TimerId = u64;

/// A callback waiting for the next frame
pub enum FrameCallback {
    /// Runs once with the frame timestamp
    Once(Box<dyn FnOnce(f64)>),
    /// Runs every frame until it returns `false` or is cancelled
    Loop(Box<dyn FnMut(f64) -> bool>),
}

/// Pending frame callbacks in request order
#[derive(Default)]
pub struct FrameScheduler {
    next_id: FrameId,
    pending: Vec<(FrameId, FrameCallback)>,
    /// Cancellations of callbacks already taken out for the running frame
    cancelled: AHashSet<FrameId>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, callback: FrameCallback) -> FrameId {
        self.next_id += 1;
        self.pending.push((self.next_id, callback));
        self.next_id
    }

    /// Cancel a pending or currently running callback
    pub fn cancel(&mut self, id: FrameId) {
        let before = self.pending.len();
        self.pending.retain(|(pending_id, _)| *pending_id != id);
        if self.pending.len() == before && id <= self.next_id {
            self.cancelled.insert(id);
        }
    }

    pub fn is_cancelled(&self, id: FrameId) -> bool {
        self.cancelled.contains(&id)
    }

    /// Everything scheduled so far; requests made while running go to the next frame
    pub fn take_pending(&mut self) -> Vec<(FrameId, FrameCallback)> {
        std::mem::take(&mut self.pending)
    }

    /// Put a loop back for the next frame under its original id
    pub fn requeue(&mut self, id: FrameId, callback: FrameCallback) {
        if !self.cancelled.contains(&id) {
            self.pending.push((id, callback));
        }
    }

    pub fn finish_frame(&mut self) {
        self.cancelled.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

struct Timer {
    id: TimerId,
    due: f64,
    callback: Box<dyn FnOnce()>,
}

/// Timers ordered by due time, then by scheduling order
#[derive(Default)]
pub struct TimerQueue {
    next_id: TimerId,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64, callback: Box<dyn FnOnce()>) -> TimerId {
        self.next_id += 1;
        self.timers.push(Timer {
            id: self.next_id,
            due,
            callback,
        });
        self.next_id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Remove and return the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, Box<dyn FnOnce()>)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;
        let timer = self.timers.remove(index);
        Some((timer.due, timer.callback))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_frame_cancel_pending_and_running() {
        let mut frames = FrameScheduler::new();
        let a = frames.request(FrameCallback::Once(Box::new(|_| {})));
        let b = frames.request(FrameCallback::Loop(Box::new(|_| true)));
        frames.cancel(a);
        assert_eq!(frames.len(), 1);

        let batch = frames.take_pending();
        assert_eq!(batch.len(), 1);
        frames.cancel(b);
        assert!(frames.is_cancelled(b));
        for (id, callback) in batch {
            frames.requeue(id, callback);
        }
        assert!(frames.is_empty());
        frames.finish_frame();
        assert!(!frames.is_cancelled(b));
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut timers = TimerQueue::new();
        for (due, label) in [(30.0, "c"), (10.0, "a"), (10.0, "b"), (50.0, "late")] {
            let log = Rc::clone(&log);
            timers.schedule(due, Box::new(move || log.borrow_mut().push(label)));
        }

        while let Some((_, callback)) = timers.pop_due(40.0) {
            callback();
        }
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(timers.len(), 1);
    }
}
