//! Intersection Observer - Viewport visibility notifications
//!
//! An observer watches a set of elements against the viewport (adjusted by its
//! root margin) and reports [`IntersectionEntry`] batches to its callback:
//!
//! - once for every element on the first computation after `observe`
//! - afterwards only when an element's intersecting state flips
//!
//! An element counts as intersecting when the visible fraction of its height
//! reaches the observer's threshold (threshold 0: any overlap at all).
//!
//! Computation happens on the page: after every scroll or resize, and on one
//! coalesced animation frame requested by `observe`.
//!
//! # Example
//!
//! ```ignore
//! let observer = page.create_observer(ObserverOptions::new(0.5), |page, entries, observer| {
//!     for entry in entries.iter().filter(|e| e.is_intersecting) {
//!         observer.unobserve(entry.target);
//!     }
//! });
//! observer.observe(counter);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::types::{ElementId, ObserverOptions, Rect};

use super::{Document, Page, WeakPage};

// =============================================================================
// TYPES
// =============================================================================

/// One visibility report for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    /// Visible fraction of the element's height, 0.0..=1.0.
    pub ratio: f32,
    /// `ratio` reached the observer's threshold.
    pub is_intersecting: bool,
}

/// Observer callback: `(page, entries, observer)`.
pub type ObserverCallback = Rc<dyn Fn(&Page, &[IntersectionEntry], &IntersectionObserver)>;

struct Target {
    element: ElementId,
    /// Last reported state; `None` until the first computation.
    last: Option<bool>,
}

struct ObserverInner {
    options: ObserverOptions,
    callback: ObserverCallback,
    targets: RefCell<Vec<Target>>,
    connected: Cell<bool>,
    page: WeakPage,
}

/// Handle to an observer registered on a [`Page`]. Cheap to clone.
#[derive(Clone)]
pub struct IntersectionObserver {
    inner: Rc<ObserverInner>,
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Visible fraction of `target` inside `root` and whether they touch at all.
///
/// Zero-height targets are fully visible when they sit inside the root.
pub fn intersection_ratio(target: Rect, root: Rect) -> (f32, bool) {
    if target.height <= 0.0 {
        let inside = root.contains_edge(target.top);
        return (if inside { 1.0 } else { 0.0 }, inside);
    }
    let overlap = target.overlap(&root);
    ((overlap / target.height).clamp(0.0, 1.0), overlap > 0.0)
}

// =============================================================================
// OBSERVER
// =============================================================================

impl IntersectionObserver {
    pub(crate) fn new(page: WeakPage, options: ObserverOptions, callback: ObserverCallback) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                options,
                callback,
                targets: RefCell::new(Vec::new()),
                connected: Cell::new(true),
                page,
            }),
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.inner.options
    }

    /// Start watching `el`. Observing twice is a no-op.
    pub fn observe(&self, el: ElementId) {
        if !self.inner.connected.get() {
            return;
        }
        {
            let mut targets = self.inner.targets.borrow_mut();
            if targets.iter().any(|t| t.element == el) {
                return;
            }
            targets.push(Target { element: el, last: None });
        }
        if let Some(page) = self.inner.page.upgrade() {
            page.schedule_intersection_check();
        }
    }

    /// Stop watching `el`. No further entries are reported for it.
    pub fn unobserve(&self, el: ElementId) {
        self.inner.targets.borrow_mut().retain(|t| t.element != el);
    }

    /// Stop watching everything and detach from the page.
    pub fn disconnect(&self) {
        self.inner.targets.borrow_mut().clear();
        if self.inner.connected.replace(false) {
            if let Some(page) = self.inner.page.upgrade() {
                page.remove_observer(self);
            }
        }
    }

    pub fn is_observing(&self, el: ElementId) -> bool {
        self.inner.targets.borrow().iter().any(|t| t.element == el)
    }

    pub fn observed_count(&self) -> usize {
        self.inner.targets.borrow().len()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.get()
    }

    pub fn ptr_eq(&self, other: &IntersectionObserver) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Compute entries whose state is new or changed, recording the new state.
    pub(crate) fn collect_entries(&self, doc: &mut Document, viewport: Rect) -> Vec<IntersectionEntry> {
        let root = self.inner.options.root_margin.apply(viewport);
        let threshold = self.inner.options.threshold;
        let mut entries = Vec::new();

        for target in self.inner.targets.borrow_mut().iter_mut() {
            let rect = doc.bounding_rect(target.element);
            let (ratio, touching) = intersection_ratio(rect, root);
            let is_intersecting = if threshold <= 0.0 {
                touching
            } else {
                ratio >= threshold
            };

            if target.last != Some(is_intersecting) {
                target.last = Some(is_intersecting);
                entries.push(IntersectionEntry {
                    target: target.element,
                    ratio,
                    is_intersecting,
                });
            }
        }
        entries
    }

    pub(crate) fn notify(&self, page: &Page, entries: &[IntersectionEntry]) {
        let callback = self.inner.callback.clone();
        callback(page, entries, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_partial_overlap() {
        let root = Rect::new(0.0, 800.0);
        let (ratio, touching) = intersection_ratio(Rect::new(760.0, 400.0), root);
        assert!((ratio - 0.1).abs() < 1e-6);
        assert!(touching);
    }

    #[test]
    fn test_ratio_disjoint_and_contained() {
        let root = Rect::new(100.0, 500.0);
        assert_eq!(intersection_ratio(Rect::new(700.0, 50.0), root), (0.0, false));
        assert_eq!(intersection_ratio(Rect::new(200.0, 50.0), root), (1.0, true));
    }

    #[test]
    fn test_ratio_zero_height() {
        let root = Rect::new(0.0, 500.0);
        assert_eq!(intersection_ratio(Rect::new(250.0, 0.0), root), (1.0, true));
        assert_eq!(intersection_ratio(Rect::new(900.0, 0.0), root), (0.0, false));
    }
}
