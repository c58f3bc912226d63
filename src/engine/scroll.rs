//! Scroll Module - Page scroll operations
//!
//! - Programmatic scrolling with clamping (`scroll_to`)
//! - User scrolling that honours the body scroll lock (`scroll_by`)
//! - Element targeting and smooth, frame-driven scroll animation
//!
//! Every offset change goes through `scroll_to`, so scroll listeners and
//! intersection observers see each intermediate position of a smooth scroll.

use std::time::Duration;

use crate::types::{ElementId, ScrollBehavior};

use super::Page;

// =============================================================================
// SCROLL CONSTANTS
// =============================================================================

/// Default duration of a smooth scroll.
pub const SMOOTH_SCROLL_DURATION: Duration = Duration::from_millis(480);

/// Ease-in-out cubic over `t` in 0.0..=1.0.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

// =============================================================================
// SCROLL OPERATIONS
// =============================================================================

impl Page {
    /// Move the viewport to `y` (clamped to the scrollable range).
    ///
    /// Dispatches a scroll event and re-evaluates observers when the offset
    /// actually changes. Programmatic: ignores the scroll lock.
    pub fn scroll_to(&self, y: f32) {
        let y = y.clamp(0.0, self.max_scroll());
        let mut viewport = self.viewport();
        if viewport.scroll_y == y {
            return;
        }
        viewport.scroll_y = y;
        self.inner.viewport.set(viewport);
        self.inner.scroll_y.set(y);

        self.dispatch(super::Event::new(super::EventKind::Scroll, None));
        self.update_intersections();
    }

    /// User scroll input (wheel, keys). Ignored while the body is scroll
    /// locked; cancels any smooth scroll in flight.
    ///
    /// Returns `true` if the offset moved.
    pub fn scroll_by(&self, dy: f32) -> bool {
        if self.document().is_scroll_locked() {
            return false;
        }
        self.cancel_smooth_scroll();
        let before = self.scroll_y();
        self.scroll_to(before + dy);
        self.scroll_y() != before
    }

    /// Offset that brings `el`'s top edge to the top of the viewport.
    pub fn scroll_target(&self, el: ElementId) -> f32 {
        let top = self.measure(|doc| doc.offset_top(el));
        top.clamp(0.0, self.max_scroll())
    }

    /// Bring `el` into view.
    pub fn scroll_into_view(&self, el: ElementId, behavior: ScrollBehavior) {
        let target = self.scroll_target(el);
        match behavior {
            ScrollBehavior::Instant => {
                self.cancel_smooth_scroll();
                self.scroll_to(target);
            }
            ScrollBehavior::Smooth => self.smooth_scroll_to(target, SMOOTH_SCROLL_DURATION),
        }
    }

    /// Animate the offset to `y` over `duration`, one step per frame.
    ///
    /// Supersedes any smooth scroll already running.
    pub fn smooth_scroll_to(&self, y: f32, duration: Duration) {
        let generation = self.cancel_smooth_scroll();
        let to = y.clamp(0.0, self.max_scroll());
        let from = self.scroll_y();
        if from == to {
            return;
        }
        if duration.is_zero() {
            self.scroll_to(to);
            return;
        }

        tracing::debug!(from, to, ?duration, "smooth scroll");
        let animation = SmoothScroll {
            from,
            to,
            duration,
            start: self.inner.scheduler.now(),
            generation,
        };
        self.request_scroll_frame(animation);
    }

    pub fn is_smooth_scrolling(&self) -> bool {
        self.inner.smooth_active.get()
    }

    /// Invalidate the running smooth scroll; returns the new generation.
    fn cancel_smooth_scroll(&self) -> u64 {
        let generation = self.inner.scroll_generation.get() + 1;
        self.inner.scroll_generation.set(generation);
        self.inner.smooth_active.set(false);
        generation
    }

    fn request_scroll_frame(&self, animation: SmoothScroll) {
        self.inner.smooth_active.set(true);
        let weak = self.downgrade();
        self.inner
            .scheduler
            .request_animation_frame(Box::new(move |now| {
                if let Some(page) = weak.upgrade() {
                    page.step_smooth_scroll(animation, now);
                }
            }));
    }

    fn step_smooth_scroll(&self, animation: SmoothScroll, now: Duration) {
        if animation.generation != self.inner.scroll_generation.get() {
            return;
        }
        let elapsed = now.saturating_sub(animation.start);
        let progress = (elapsed.as_secs_f32() / animation.duration.as_secs_f32()).min(1.0);
        let y = animation.from + (animation.to - animation.from) * ease_in_out_cubic(progress);
        self.scroll_to(y);

        if progress < 1.0 {
            self.request_scroll_frame(animation);
        } else {
            self.inner.smooth_active.set(false);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SmoothScroll {
    from: f32,
    to: f32,
    duration: Duration,
    start: Duration,
    generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Document, Element, EventKind, VirtualScheduler};
    use crate::types::{Overflow, Viewport};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Page, Rc<VirtualScheduler>, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(body, Element::new("header").height(500.0));
        let target = doc.append(body, Element::new("section").id("contact").height(2000.0));
        let sched = Rc::new(VirtualScheduler::new());
        let page = Page::new(doc, sched.clone(), Viewport::new(800.0, 600.0));
        (page, sched, target)
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert!(ease_in_out_cubic(0.25) < 0.25);
        assert!(ease_in_out_cubic(0.75) > 0.75);
    }

    #[test]
    fn test_instant_scroll_into_view() {
        let (page, _, target) = setup();
        page.scroll_into_view(target, ScrollBehavior::Instant);
        assert_eq!(page.scroll_y(), 500.0);
    }

    #[test]
    fn test_smooth_scroll_reaches_target_monotonically() {
        let (page, sched, target) = setup();
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let o = offsets.clone();
        page.add_window_listener(EventKind::Scroll, move |page, _| o.borrow_mut().push(page.scroll_y()));

        page.scroll_into_view(target, ScrollBehavior::Smooth);
        assert_eq!(page.scroll_y(), 0.0);
        assert!(page.is_smooth_scrolling());

        // 480ms at 16ms per frame
        sched.run_frames(30);
        assert_eq!(page.scroll_y(), 500.0);
        assert!(!page.is_smooth_scrolling());
        assert_eq!(sched.pending_frames(), 0);

        let offsets = offsets.borrow();
        assert!(offsets.len() > 10);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_user_scroll_cancels_smooth_scroll() {
        let (page, sched, target) = setup();
        page.scroll_into_view(target, ScrollBehavior::Smooth);
        sched.run_frames(5);
        let mid = page.scroll_y();
        assert!(mid > 0.0 && mid < 500.0);

        assert!(page.scroll_by(10.0));
        assert!(!page.is_smooth_scrolling());
        sched.run_frames(40);
        assert_eq!(page.scroll_y(), mid + 10.0);
    }

    #[test]
    fn test_scroll_lock_blocks_user_scroll_only() {
        let (page, _, _) = setup();
        page.update_document(|doc| doc.set_body_overflow(Overflow::Hidden));

        assert!(!page.scroll_by(100.0));
        assert_eq!(page.scroll_y(), 0.0);

        page.scroll_to(100.0);
        assert_eq!(page.scroll_y(), 100.0);
    }

    #[test]
    fn test_target_clamped_to_scroll_range() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(body, Element::new("section").height(700.0));
        let last = doc.append(body, Element::new("section").id("last").height(100.0));
        let sched = Rc::new(VirtualScheduler::new());
        let page = Page::new(doc, sched, Viewport::new(800.0, 600.0));

        // content 800, viewport 600
        assert_eq!(page.scroll_target(last), 200.0);
    }
}
