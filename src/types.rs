//! Core Types - Shared value types for the page-interaction layer
//!
//! Everything the engine and behaviors pass around by value lives here:
//! element handles, style-class flags, vertical geometry, viewport state and
//! intersection-observer options.

use std::fmt;

// =============================================================================
// ElementId - Handle into the document arena
// =============================================================================

/// Handle to an element in a [`Document`](crate::engine::Document).
///
/// Ids are indices into the document arena. They are stable for the lifetime
/// of the document (elements are never removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl ElementId {
    /// Arena index of this element.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// ClassSet (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Style classes the interaction layer reads or toggles.
    ///
    /// Any other class name an element carries is kept verbatim in
    /// `Element::extra_classes` and never interpreted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassSet: u16 {
        const NONE = 0;
        /// Navbar past the scroll threshold.
        const SCROLLED = 1 << 0;
        /// Highlighted nav link / pressed menu toggle.
        const ACTIVE = 1 << 1;
        /// Mobile menu expanded.
        const OPEN = 1 << 2;
        /// Reveal target that has faded in.
        const VISIBLE = 1 << 3;
        /// Element that fades in on first sight.
        const REVEAL = 1 << 4;
        /// Animated numeric counter.
        const STAT_NUMBER = 1 << 5;
        /// Navigation entry.
        const NAV_LINK = 1 << 6;
        /// Submit control.
        const BTN = 1 << 7;
    }
}

impl ClassSet {
    const NAMES: [(&'static str, ClassSet); 8] = [
        ("scrolled", ClassSet::SCROLLED),
        ("active", ClassSet::ACTIVE),
        ("open", ClassSet::OPEN),
        ("visible", ClassSet::VISIBLE),
        ("reveal", ClassSet::REVEAL),
        ("stat-number", ClassSet::STAT_NUMBER),
        ("nav-link", ClassSet::NAV_LINK),
        ("btn", ClassSet::BTN),
    ];

    /// Map a class name to its flag. Unknown names return `None`.
    pub fn from_name(name: &str) -> Option<ClassSet> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, flag)| *flag)
    }

    /// Class names of every flag in this set, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(n, _)| *n)
            .collect()
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// A vertical span in document coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Height of the overlap with `other`, zero when disjoint.
    pub fn overlap(&self, other: &Rect) -> f32 {
        (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0.0)
    }

    /// Whether `y` lies inside `[top, bottom]`.
    pub fn contains_edge(&self, y: f32) -> bool {
        y >= self.top && y <= self.bottom()
    }
}

/// Visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset (`window.scrollY`).
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { scroll_y: 0.0, width, height }
    }

    /// The document span currently on screen.
    pub fn rect(&self) -> Rect {
        Rect::new(self.scroll_y, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

// =============================================================================
// Observer options
// =============================================================================

/// Margin applied to the viewport before intersecting (CSS `rootMargin`).
///
/// Positive values grow the root, negative values shrink it. Only the
/// vertical edges matter for a vertically scrolling page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: f32,
    pub bottom: f32,
}

impl RootMargin {
    /// Shrink the bottom edge by `px`, firing `px` before an element reaches it.
    pub fn bottom_inset(px: f32) -> Self {
        Self { top: 0.0, bottom: -px }
    }

    /// Apply the margin to a viewport rect.
    pub fn apply(&self, root: Rect) -> Rect {
        let top = root.top - self.top;
        let bottom = root.bottom() + self.bottom;
        Rect::new(top, (bottom - top).max(0.0))
    }
}

/// Options for an [`IntersectionObserver`](crate::engine::IntersectionObserver).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObserverOptions {
    /// Visible fraction (0.0..=1.0) at which an element counts as intersecting.
    pub threshold: f32,
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, root_margin: RootMargin::default() }
    }

    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }
}

// =============================================================================
// Scroll / style enums
// =============================================================================

/// How `scroll_into_view` moves the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Instant,
    Smooth,
}

/// Body overflow style. `Hidden` is the scroll lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}
