//! Scheduler - Injectable timers and animation frames
//!
//! Every deferred piece of work on the page (typewriter ticks, counter frames,
//! the contact-form revert, smooth scrolling) goes through the [`Scheduler`]
//! trait instead of a real clock, so hosts decide how time passes.
//!
//! [`VirtualScheduler`] is the deterministic implementation used by tests and
//! the terminal host: time only moves when the owner calls [`advance`] or
//! [`run_frame`].
//!
//! # Example
//!
//! ```ignore
//! let scheduler = VirtualScheduler::new();
//! scheduler.set_timeout(Duration::from_millis(3000), Box::new(|| revert()));
//!
//! scheduler.advance(Duration::from_millis(2999)); // nothing yet
//! scheduler.advance(Duration::from_millis(1));    // revert() runs
//! ```
//!
//! [`advance`]: VirtualScheduler::advance
//! [`run_frame`]: VirtualScheduler::run_frame

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

// =============================================================================
// TYPES
// =============================================================================

/// One-shot timer callback.
pub type Task = Box<dyn FnOnce()>;

/// Animation frame callback; receives the frame timestamp.
pub type FrameTask = Box<dyn FnOnce(Duration)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// Default frame interval (~60fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Host time source: deferred re-invocation, never blocking sleep.
pub trait Scheduler {
    /// Time elapsed since the scheduler started.
    fn now(&self) -> Duration;

    /// Run `task` once, `delay` from now.
    fn set_timeout(&self, delay: Duration, task: Task) -> TimerId;

    /// Drop a pending timer. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);

    /// Run `task` on the next animation frame.
    fn request_animation_frame(&self, task: FrameTask) -> FrameId;

    /// Drop a pending frame callback. Unknown or already-run ids are ignored.
    fn cancel_animation_frame(&self, id: FrameId);
}

// =============================================================================
// VIRTUAL SCHEDULER
// =============================================================================

struct VirtualState {
    now: Duration,
    next_id: u64,
    frame_interval: Duration,
    /// Keyed by (due, id) so equal due times fire in scheduling order.
    timers: BTreeMap<(Duration, u64), Task>,
    timer_due: HashMap<u64, Duration>,
    frames: Vec<(u64, FrameTask)>,
    /// Cancellations aimed at frames of the batch currently running.
    cancelled_frames: HashSet<u64>,
}

impl VirtualState {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn pop_due(&mut self, deadline: Duration) -> Option<(Duration, Task)> {
        let key = *self.timers.keys().next()?;
        if key.0 > deadline {
            return None;
        }
        let task = self.timers.remove(&key)?;
        self.timer_due.remove(&key.1);
        Some((key.0, task))
    }
}

/// Deterministic scheduler driven by explicit clock advances.
///
/// No task ever runs while the scheduler's own state is borrowed, so tasks
/// are free to schedule or cancel further work.
pub struct VirtualScheduler {
    state: RefCell<VirtualState>,
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::with_frame_interval(FRAME_INTERVAL)
    }

    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self {
            state: RefCell::new(VirtualState {
                now: Duration::ZERO,
                next_id: 0,
                frame_interval,
                timers: BTreeMap::new(),
                timer_due: HashMap::new(),
                frames: Vec::new(),
                cancelled_frames: HashSet::new(),
            }),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.state.borrow().frame_interval
    }

    /// Move the clock forward by `by`, firing due timers in due-time order.
    ///
    /// Each timer runs with the clock set to its own due time. Timers that
    /// become due inside the window because of earlier timers also fire.
    /// Animation frames are not run.
    pub fn advance(&self, by: Duration) {
        let deadline = self.state.borrow().now + by;
        loop {
            let next = self.state.borrow_mut().pop_due(deadline);
            let Some((due, task)) = next else {
                break;
            };
            {
                let mut state = self.state.borrow_mut();
                if due > state.now {
                    state.now = due;
                }
            }
            task();
        }
        let mut state = self.state.borrow_mut();
        if deadline > state.now {
            state.now = deadline;
        }
    }

    /// Take the frame callbacks queued before the call, advance one frame
    /// interval, then run them.
    ///
    /// Callbacks requested by timers firing inside the interval, or by the
    /// frame itself, wait for the next one. A timer may still cancel a
    /// callback of the taken batch. Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let batch = {
            let mut state = self.state.borrow_mut();
            state.cancelled_frames.clear();
            std::mem::take(&mut state.frames)
        };

        let interval = self.frame_interval();
        self.advance(interval);
        let now = self.state.borrow().now;

        let mut ran = 0;
        for (id, task) in batch {
            if self.state.borrow().cancelled_frames.contains(&id) {
                continue;
            }
            task(now);
            ran += 1;
        }
        self.state.borrow_mut().cancelled_frames.clear();
        ran
    }

    /// Run `n` frames back to back.
    pub fn run_frames(&self, n: usize) {
        for _ in 0..n {
            self.run_frame();
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Duration {
        self.state.borrow().now
    }

    fn set_timeout(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let due = state.now + delay;
        state.timers.insert((due, id), task);
        state.timer_due.insert(id, due);
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        if let Some(due) = state.timer_due.remove(&id.0) {
            state.timers.remove(&(due, id.0));
        }
    }

    fn request_animation_frame(&self, task: FrameTask) -> FrameId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.frames.push((id, task));
        FrameId(id)
    }

    fn cancel_animation_frame(&self, id: FrameId) {
        let mut state = self.state.borrow_mut();
        let before = state.frames.len();
        state.frames.retain(|(frame, _)| *frame != id.0);
        if state.frames.len() == before {
            state.cancelled_frames.insert(id.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let sched = VirtualScheduler::new();
        let seen = log();

        for (delay, name) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let seen = seen.clone();
            sched.set_timeout(ms(delay), Box::new(move || seen.borrow_mut().push(name.into())));
        }

        sched.advance(ms(15));
        assert_eq!(*seen.borrow(), vec!["a", "a2"]);
        sched.advance(ms(100));
        assert_eq!(*seen.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(sched.now(), ms(115));
    }

    #[test]
    fn test_timer_sees_its_due_time() {
        let sched = Rc::new(VirtualScheduler::new());
        let at = Rc::new(RefCell::new(Duration::ZERO));

        let (s, a) = (sched.clone(), at.clone());
        sched.set_timeout(ms(40), Box::new(move || *a.borrow_mut() = s.now()));
        sched.advance(ms(1000));

        assert_eq!(*at.borrow(), ms(40));
    }

    #[test]
    fn test_rescheduling_inside_window_fires() {
        let sched = Rc::new(VirtualScheduler::new());
        let count = Rc::new(RefCell::new(0));

        fn again(sched: Rc<VirtualScheduler>, count: Rc<RefCell<u32>>) {
            *count.borrow_mut() += 1;
            let s = sched.clone();
            sched.set_timeout(ms(100), Box::new(move || again(s, count)));
        }

        let (s, c) = (sched.clone(), count.clone());
        sched.set_timeout(ms(100), Box::new(move || again(s, c)));
        sched.advance(ms(350));

        assert_eq!(*count.borrow(), 3);
        assert_eq!(sched.pending_timers(), 1);
    }

    #[test]
    fn test_clear_timeout() {
        let sched = VirtualScheduler::new();
        let seen = log();
        let s = seen.clone();
        let id = sched.set_timeout(ms(10), Box::new(move || s.borrow_mut().push("x".into())));

        sched.clear_timeout(id);
        sched.clear_timeout(id);
        sched.advance(ms(50));

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_frames_requested_during_frame_wait() {
        let sched = Rc::new(VirtualScheduler::new());
        let seen = log();

        let (s, l) = (sched.clone(), seen.clone());
        sched.request_animation_frame(Box::new(move |_| {
            l.borrow_mut().push("first".into());
            let l = l.clone();
            s.request_animation_frame(Box::new(move |_| l.borrow_mut().push("second".into())));
        }));

        assert_eq!(sched.run_frame(), 1);
        assert_eq!(*seen.borrow(), vec!["first"]);
        assert_eq!(sched.run_frame(), 1);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(sched.run_frame(), 0);
    }

    #[test]
    fn test_run_frame_advances_clock_and_timers() {
        let sched = VirtualScheduler::new();
        let seen = log();
        let s = seen.clone();
        sched.set_timeout(ms(20), Box::new(move || s.borrow_mut().push("timer".into())));

        sched.run_frame();
        assert_eq!(sched.now(), FRAME_INTERVAL);
        assert!(seen.borrow().is_empty());

        sched.run_frame();
        assert_eq!(*seen.borrow(), vec!["timer"]);
    }

    #[test]
    fn test_cancel_frame_from_same_batch() {
        let sched = Rc::new(VirtualScheduler::new());
        let seen = log();
        let victim = Rc::new(RefCell::new(None));

        let (s, v) = (sched.clone(), victim.clone());
        sched.request_animation_frame(Box::new(move |_| {
            if let Some(id) = v.borrow_mut().take() {
                s.cancel_animation_frame(id);
            }
        }));
        let l = seen.clone();
        let id = sched.request_animation_frame(Box::new(move |_| l.borrow_mut().push("ran".into())));
        *victim.borrow_mut() = Some(id);

        assert_eq!(sched.run_frame(), 1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_frame_requested_by_timer_waits_for_next_frame() {
        let sched = Rc::new(VirtualScheduler::new());
        let seen = log();

        let (s, l) = (sched.clone(), seen.clone());
        sched.set_timeout(ms(5), Box::new(move || {
            let l = l.clone();
            s.request_animation_frame(Box::new(move |_| l.borrow_mut().push("frame".into())));
        }));

        assert_eq!(sched.run_frame(), 0);
        assert!(seen.borrow().is_empty());
        assert_eq!(sched.pending_frames(), 1);

        assert_eq!(sched.run_frame(), 1);
        assert_eq!(*seen.borrow(), vec!["frame"]);
    }

    #[test]
    fn test_timer_cancels_frame_of_taken_batch() {
        let sched = Rc::new(VirtualScheduler::new());
        let seen = log();

        let l = seen.clone();
        let id = sched.request_animation_frame(Box::new(move |_| l.borrow_mut().push("ran".into())));
        let s = sched.clone();
        sched.set_timeout(ms(5), Box::new(move || s.cancel_animation_frame(id)));

        assert_eq!(sched.run_frame(), 0);
        assert!(seen.borrow().is_empty());
    }
}
