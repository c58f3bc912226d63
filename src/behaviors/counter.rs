//! Counter - Count `.stat-number` elements up to their `data-count` once seen.
//!
//! The increment is sized so the animation spans `duration / frame` frames
//! (1500ms at 16ms: 93.75 frames). Each frame adds the increment, shows the
//! floored value, and the final frame shows the exact target.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crate::config::CounterConfig;
use crate::engine::{FrameId, IntersectionEntry, IntersectionObserver, Page};
use crate::error::Result;
use crate::types::{ClassSet, ElementId, ObserverOptions};

use super::Cleanup;

pub const NAME: &str = "counter";

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Parse a leading integer the lenient way: optional whitespace and sign,
/// then digits; anything after the digits is ignored.
pub fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterFrame {
    /// Value to display; more frames follow.
    Running(i64),
    /// Target reached; display it and stop.
    Finished(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterState {
    pub current: f64,
    pub target: i64,
    pub increment: f64,
}

impl CounterState {
    pub fn new(target: i64, duration: Duration, frame: Duration) -> Self {
        let frames = duration.as_secs_f64() / frame.as_secs_f64();
        Self {
            current: 0.0,
            target,
            increment: target as f64 / frames,
        }
    }

    pub fn step(&mut self) -> CounterFrame {
        self.current += self.increment;
        if self.current >= self.target as f64 {
            self.current = self.target as f64;
            CounterFrame::Finished(self.target)
        } else {
            CounterFrame::Running(self.current.floor() as i64)
        }
    }
}

// =============================================================================
// BEHAVIOR
// =============================================================================

pub struct CounterAnimator {
    attribute: String,
    duration: Duration,
    frame: Duration,
    started: RefCell<HashSet<ElementId>>,
    running: RefCell<HashMap<ElementId, FrameId>>,
}

impl CounterAnimator {
    pub fn new(config: &CounterConfig) -> Self {
        Self {
            attribute: config.attribute.clone(),
            duration: Duration::from_millis(config.duration_ms),
            frame: Duration::from_millis(config.frame_ms),
            started: RefCell::new(HashSet::new()),
            running: RefCell::new(HashMap::new()),
        }
    }

    pub fn attach(page: &Page, config: &CounterConfig) -> Result<Cleanup> {
        config.validate()?;
        let targets = page.document().query_class(ClassSet::STAT_NUMBER);
        let animator = Rc::new(Self::new(config));

        let a = animator.clone();
        let observer = page.create_observer(ObserverOptions::new(config.threshold), move |page, entries, observer| {
            a.on_entries(page, entries, observer);
        });
        for target in targets {
            observer.observe(target);
        }

        let scheduler = page.scheduler();
        Ok(Box::new(move || {
            observer.disconnect();
            for (_, frame) in animator.running.borrow_mut().drain() {
                scheduler.cancel_animation_frame(frame);
            }
        }))
    }

    /// Elements currently counting.
    pub fn running_count(&self) -> usize {
        self.running.borrow().len()
    }

    fn on_entries(self: &Rc<Self>, page: &Page, entries: &[IntersectionEntry], observer: &IntersectionObserver) {
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            let el = entry.target;
            observer.unobserve(el);
            if !self.started.borrow_mut().insert(el) {
                continue;
            }

            let raw = page.document().attribute(el, &self.attribute).map(str::to_owned);
            match raw.as_deref().and_then(parse_count) {
                Some(target) => {
                    tracing::debug!(%el, target, "counter start");
                    let state = CounterState::new(target, self.duration, self.frame);
                    self.request_step(page, el, state);
                }
                None => {
                    tracing::warn!(%el, value = ?raw, attribute = %self.attribute, "counter target is not a number");
                }
            }
        }
    }

    fn request_step(self: &Rc<Self>, page: &Page, el: ElementId, state: CounterState) {
        let this = self.clone();
        let weak = page.downgrade();
        let frame = page.scheduler().request_animation_frame(Box::new(move |_| {
            if let Some(page) = weak.upgrade() {
                this.step(&page, el, state);
            }
        }));
        self.running.borrow_mut().insert(el, frame);
    }

    fn step(self: &Rc<Self>, page: &Page, el: ElementId, mut state: CounterState) {
        match state.step() {
            CounterFrame::Running(value) => {
                page.update_document(|doc| doc.set_text(el, value.to_string()));
                self.request_step(page, el, state);
            }
            CounterFrame::Finished(value) => {
                page.update_document(|doc| doc.set_text(el, value.to_string()));
                self.running.borrow_mut().remove(&el);
                tracing::debug!(%el, value, "counter finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Document, Element, VirtualScheduler};
    use crate::types::Viewport;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_parse_count_is_lenient() {
        assert_eq!(parse_count("150"), Some(150));
        assert_eq!(parse_count("  42px"), Some(42));
        assert_eq!(parse_count("-7"), Some(-7));
        assert_eq!(parse_count("+9+"), Some(9));
        assert_eq!(parse_count("12.9"), Some(12));
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-"), None);
    }

    #[test]
    fn test_reaches_target_on_frame_94() {
        let mut state = CounterState::new(100, ms(1500), ms(16));
        for frame in 1..=93 {
            match state.step() {
                CounterFrame::Running(v) => assert!(v < 100, "frame {frame} showed {v}"),
                CounterFrame::Finished(_) => panic!("finished early on frame {frame}"),
            }
        }
        assert_eq!(state.step(), CounterFrame::Finished(100));
    }

    #[test]
    fn test_values_never_decrease() {
        let mut state = CounterState::new(37, ms(1500), ms(16));
        let mut last = 0;
        loop {
            match state.step() {
                CounterFrame::Running(v) => {
                    assert!(v >= last);
                    last = v;
                }
                CounterFrame::Finished(v) => {
                    assert_eq!(v, 37);
                    break;
                }
            }
        }
    }

    #[test]
    fn test_zero_and_negative_finish_immediately() {
        assert_eq!(CounterState::new(0, ms(1500), ms(16)).step(), CounterFrame::Finished(0));
        assert_eq!(CounterState::new(-5, ms(1500), ms(16)).step(), CounterFrame::Finished(-5));
    }

    fn setup(count: &str) -> (Page, Rc<VirtualScheduler>, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(body, Element::new("section").height(2000.0));
        let stat = doc.append(
            body,
            Element::new("span").class("stat-number").attr("data-count", count).text("0").height(100.0),
        );
        doc.append(body, Element::new("footer").height(1000.0));
        let sched = Rc::new(VirtualScheduler::new());
        let page = Page::new(doc, sched.clone(), Viewport::new(1280.0, 800.0));
        (page, sched, stat)
    }

    #[test]
    fn test_counts_up_once_when_half_visible() {
        let (page, sched, stat) = setup("50");
        let _cleanup = CounterAnimator::attach(&page, &CounterConfig::default()).unwrap();
        sched.run_frame();
        assert_eq!(page.document().text(stat), Some("0"));

        // stat spans 2000..2100; half visible once y + 800 >= 2050
        page.scroll_to(1250.0);
        sched.run_frames(100);
        assert_eq!(page.document().text(stat), Some("50"));

        // leaving and re-entering does not restart
        page.scroll_to(0.0);
        page.scroll_to(1300.0);
        sched.run_frame();
        assert_eq!(page.document().text(stat), Some("50"));
    }

    #[test]
    fn test_first_value_on_next_frame() {
        let (page, sched, stat) = setup("1000");
        let _cleanup = CounterAnimator::attach(&page, &CounterConfig::default()).unwrap();
        page.scroll_to(1300.0);
        assert_eq!(page.document().text(stat), Some("0"));
        sched.run_frame();
        assert_eq!(page.document().text(stat), Some("10"));
    }

    #[test]
    fn test_non_numeric_target_left_alone() {
        let (page, sched, stat) = setup("lots");
        let _cleanup = CounterAnimator::attach(&page, &CounterConfig::default()).unwrap();
        page.scroll_to(1300.0);
        sched.run_frames(5);
        assert_eq!(page.document().text(stat), Some("0"));
        assert_eq!(sched.pending_frames(), 0);
    }

    #[test]
    fn test_repeated_notification_starts_once() {
        let (page, sched, stat) = setup("50");
        let animator = Rc::new(CounterAnimator::new(&CounterConfig::default()));
        let observer = page.create_observer(ObserverOptions::new(0.5), |_, _, _| {});
        let entry = IntersectionEntry {
            target: stat,
            ratio: 1.0,
            is_intersecting: true,
        };

        animator.on_entries(&page, &[entry], &observer);
        animator.on_entries(&page, &[entry, entry], &observer);
        assert_eq!(animator.running_count(), 1);
        assert_eq!(sched.pending_frames(), 1);

        sched.run_frames(100);
        assert_eq!(page.document().text(stat), Some("50"));
        assert_eq!(animator.running_count(), 0);
    }

    #[test]
    fn test_zero_frame_interval_refuses_to_attach() {
        let (page, sched, _) = setup("50");
        let config = CounterConfig {
            frame_ms: 0,
            ..CounterConfig::default()
        };
        let err = CounterAnimator::attach(&page, &config).err();
        assert!(matches!(err, Some(crate::error::Error::InvalidConfig(_))));
        assert_eq!(page.observer_count(), 0);
        assert_eq!(sched.pending_frames(), 0);
    }

    #[test]
    fn test_cleanup_cancels_running_animation() {
        let (page, sched, stat) = setup("500");
        let cleanup = CounterAnimator::attach(&page, &CounterConfig::default()).unwrap();
        page.scroll_to(1300.0);
        sched.run_frames(3);
        let shown = page.document().text(stat).map(str::to_owned);

        cleanup();
        sched.run_frames(10);
        assert_eq!(page.document().text(stat).map(str::to_owned), shown);
        assert_eq!(sched.pending_frames(), 0);
    }
}
