use crate::types::ElementId;

/// Height of one line of text, in pixels.
pub const LINE_HEIGHT: f32 = 24.0;

/// Computed layout, indexed by element.
///
/// `top` is document-absolute (the element's `offsetTop` against `body`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedLayout {
    pub top: Vec<f32>,
    pub height: Vec<f32>,
    /// Height of `body`, i.e. the scrollable extent of the page.
    pub content_height: f32,
}

impl ComputedLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(len: usize) -> Self {
        Self {
            top: vec![0.0; len],
            height: vec![0.0; len],
            content_height: 0.0,
        }
    }

    /// Absolute top of `el`; zero for elements outside the layout.
    pub fn top(&self, el: ElementId) -> f32 {
        self.top.get(el.0).copied().unwrap_or(0.0)
    }

    pub fn height(&self, el: ElementId) -> f32 {
        self.height.get(el.0).copied().unwrap_or(0.0)
    }
}
