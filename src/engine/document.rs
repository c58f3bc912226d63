//! Document - Element arena standing in for the host view
//!
//! Elements live in a flat arena and are addressed by [`ElementId`]. The tree
//! is kept through `parent`/`children` links; every query walks it in
//! document (pre-)order so results match what `querySelectorAll` returns.
//!
//! Layout is derived, never stored by hand: any change that can move an
//! element (appending, explicit heights, line count of text) drops the cached
//! [`ComputedLayout`], and the next offset query recomputes it.

use std::collections::BTreeMap;

use crate::layout::{ComputedLayout, compute_layout};
use crate::types::{ClassSet, ElementId, Overflow, Rect};

// =============================================================================
// Element
// =============================================================================

/// A node of the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: ClassSet,
    /// Class names with no meaning to this crate, kept for rendering.
    pub extra_classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    /// Displayed content (`textContent` / `innerHTML`).
    pub text: String,
    /// Current value of a form field.
    pub value: String,
    /// Inline background override.
    pub background: Option<String>,
    /// Inline overflow style (only meaningful on `body`).
    pub overflow: Overflow,
    /// Explicit box height in pixels; `None` sizes from content.
    pub height: Option<f32>,
    /// Lay children out horizontally.
    pub row: bool,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class by name. Known names set a [`ClassSet`] flag.
    pub fn class(mut self, name: &str) -> Self {
        match ClassSet::from_name(name) {
            Some(flag) => self.classes |= flag,
            None => self.extra_classes.push(name.to_string()),
        }
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn height(mut self, px: f32) -> Self {
        self.height = Some(px);
        self
    }

    pub fn row(mut self) -> Self {
        self.row = true;
        self
    }

    pub fn has_class(&self, class: ClassSet) -> bool {
        self.classes.contains(class)
    }

    /// Number of text lines, used to size leaves without explicit height.
    pub fn line_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.lines().count().max(1)
        }
    }

    fn is_form_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

// =============================================================================
// Document
// =============================================================================

/// The element tree plus its lazily computed layout.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    body: ElementId,
    layout_width: f32,
    layout: Option<ComputedLayout>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only `body`.
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new("body")],
            body: ElementId(0),
            layout_width: 1280.0,
            layout: None,
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        // `body` always exists.
        false
    }

    /// Append `element` as the last child of `parent` and return its handle.
    ///
    /// An unknown parent falls back to `body`.
    pub fn append(&mut self, parent: ElementId, mut element: Element) -> ElementId {
        let parent = if self.contains(parent) { parent } else { self.body };
        let id = ElementId(self.elements.len());
        element.parent = Some(parent);
        element.children.clear();
        self.elements.push(element);
        self.elements[parent.0].children.push(id);
        self.invalidate_layout();
        id
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id.0 < self.elements.len()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// `root` and all of its descendants in document order.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.elements[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .find(|el| self.elements[el.0].id.as_deref() == Some(id))
    }

    /// Every element carrying `class`, in document order.
    pub fn query_class(&self, class: ClassSet) -> Vec<ElementId> {
        self.query_class_within(self.body, class)
    }

    /// Descendants of `root` (excluding `root`) carrying `class`.
    pub fn query_class_within(&self, root: ElementId, class: ClassSet) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .skip(1)
            .filter(|el| self.elements[el.0].has_class(class))
            .collect()
    }

    pub fn first_class_within(&self, root: ElementId, class: ClassSet) -> Option<ElementId> {
        self.query_class_within(root, class).into_iter().next()
    }

    /// `section[id]` elements in document order.
    pub fn sections_with_id(&self) -> Vec<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|el| {
                let element = &self.elements[el.0];
                element.tag == "section" && element.id.is_some()
            })
            .collect()
    }

    /// `a[href^="#"]` elements in document order.
    pub fn fragment_anchors(&self) -> Vec<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|el| {
                let element = &self.elements[el.0];
                element.tag == "a"
                    && element
                        .attributes
                        .get("href")
                        .is_some_and(|href| href.starts_with('#'))
            })
            .collect()
    }

    /// Resolve an in-page link target like `#about`.
    ///
    /// A bare `#` or an unknown id resolves to nothing.
    pub fn resolve_fragment(&self, href: &str) -> Option<ElementId> {
        let id = href.strip_prefix('#')?;
        if id.is_empty() {
            return None;
        }
        self.get_element_by_id(id)
    }

    /// `input`, `textarea` and `select` descendants of `form`.
    pub fn form_fields(&self, form: ElementId) -> Vec<ElementId> {
        self.descendants(form)
            .into_iter()
            .skip(1)
            .filter(|el| self.elements[el.0].is_form_field())
            .collect()
    }

    /// `el` followed by its ancestors up to `body`.
    pub fn ancestors_inclusive(&self, el: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self.contains(el).then_some(el);
        while let Some(id) = current {
            out.push(id);
            current = self.elements[id.0].parent;
        }
        out
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub fn has_class(&self, el: ElementId, class: ClassSet) -> bool {
        self.get(el).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, el: ElementId, class: ClassSet) {
        if let Some(e) = self.get_mut(el) {
            e.classes.insert(class);
        }
    }

    pub fn remove_class(&mut self, el: ElementId, class: ClassSet) {
        if let Some(e) = self.get_mut(el) {
            e.classes.remove(class);
        }
    }

    /// Flip `class` and return whether it is now present.
    pub fn toggle_class(&mut self, el: ElementId, class: ClassSet) -> bool {
        match self.get_mut(el) {
            Some(e) => {
                e.classes.toggle(class);
                e.classes.contains(class)
            }
            None => false,
        }
    }

    /// Add or remove `class` depending on `on`.
    pub fn set_class(&mut self, el: ElementId, class: ClassSet, on: bool) {
        if let Some(e) = self.get_mut(el) {
            e.classes.set(class, on);
        }
    }

    // =========================================================================
    // Content and inline style
    // =========================================================================

    pub fn text(&self, el: ElementId) -> Option<&str> {
        self.get(el).map(|e| e.text.as_str())
    }

    pub fn set_text(&mut self, el: ElementId, text: impl Into<String>) {
        let Some(e) = self.get_mut(el) else {
            return;
        };
        let before = e.line_count();
        e.text = text.into();
        let after = e.line_count();
        if before != after && e.height.is_none() {
            self.invalidate_layout();
        }
    }

    pub fn value(&self, el: ElementId) -> Option<&str> {
        self.get(el).map(|e| e.value.as_str())
    }

    pub fn set_value(&mut self, el: ElementId, value: impl Into<String>) {
        if let Some(e) = self.get_mut(el) {
            e.value = value.into();
        }
    }

    pub fn attribute(&self, el: ElementId, name: &str) -> Option<&str> {
        self.get(el)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_attribute(&mut self, el: ElementId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(e) = self.get_mut(el) {
            e.attributes.insert(name.into(), value.into());
        }
    }

    pub fn background(&self, el: ElementId) -> Option<&str> {
        self.get(el).and_then(|e| e.background.as_deref())
    }

    /// Set or clear (`None`) the inline background.
    pub fn set_background(&mut self, el: ElementId, background: Option<String>) {
        if let Some(e) = self.get_mut(el) {
            e.background = background;
        }
    }

    pub fn body_overflow(&self) -> Overflow {
        self.elements[self.body.0].overflow
    }

    pub fn set_body_overflow(&mut self, overflow: Overflow) {
        let body = self.body;
        self.elements[body.0].overflow = overflow;
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.body_overflow() == Overflow::Hidden
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn set_height(&mut self, el: ElementId, px: Option<f32>) {
        if let Some(e) = self.get_mut(el) {
            e.height = px;
            self.invalidate_layout();
        }
    }

    /// Width the layout is computed against. Changing it relayouts.
    pub fn set_layout_width(&mut self, width: f32) {
        if self.layout_width != width {
            self.layout_width = width;
            self.invalidate_layout();
        }
    }

    pub fn invalidate_layout(&mut self) {
        self.layout = None;
    }

    /// Current layout, recomputed if anything moved since the last query.
    pub fn layout(&mut self) -> &ComputedLayout {
        if self.layout.is_none() {
            self.layout = Some(compute_layout(self, self.layout_width));
        }
        self.layout.get_or_insert_with(ComputedLayout::default)
    }

    /// Document-relative top (`offsetTop` against `body`).
    pub fn offset_top(&mut self, el: ElementId) -> f32 {
        self.layout().top(el)
    }

    /// Rendered height (`offsetHeight`).
    pub fn offset_height(&mut self, el: ElementId) -> f32 {
        self.layout().height(el)
    }

    pub fn bounding_rect(&mut self, el: ElementId) -> Rect {
        let layout = self.layout();
        Rect::new(layout.top(el), layout.height(el))
    }

    /// Full scrollable height of the page.
    pub fn content_height(&mut self) -> f32 {
        self.layout().content_height
    }

    /// Raw element slice, indexed by `ElementId`.
    pub(crate) fn elements(&self) -> &[Element] {
        &self.elements
    }
}
