//! Renderer - Text projection of the page viewport
//!
//! [`render_viewport`] turns the elements overlapping the viewport into text
//! rows, one row per `px_per_row` pixels of page height. Each element is shown
//! on the row where its top edge falls, indented by depth:
//!
//! ```text
//! nav#navbar .scrolled
//!   a .nav-logo  Portfolio
//!   ul#nav-menu .nav-menu
//! section#about
//!   h2 .visible .reveal .section-title  About Me
//! ```
//!
//! Pure: reads the page, never mutates it. The [`terminal`] module draws the
//! lines with crossterm.

pub mod terminal;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::engine::{Document, Element, Page};
use crate::types::{ElementId, Rect};

/// Pixels per text column when fitting lines to the viewport width.
pub const COLUMN_PX: f32 = 8.0;

/// One row of the preview.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewLine {
    /// Elements whose top edge falls in this row, outermost first.
    pub elements: Vec<ElementId>,
    pub text: String,
}

impl PreviewLine {
    pub fn is_blank(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Project the current viewport into `rows` text lines.
pub fn render_viewport(page: &Page, rows: usize, px_per_row: f32) -> Vec<PreviewLine> {
    let viewport = page.viewport();
    let columns = (viewport.width / COLUMN_PX).floor().max(1.0) as usize;
    let px_per_row = px_per_row.max(1.0);

    page.measure(|doc| {
        let body = doc.body();
        let mut lines = vec![PreviewLine::default(); rows];

        for el in doc.descendants(body).into_iter().skip(1) {
            let rect = doc.bounding_rect(el);
            if !(rect.overlap(&viewport.rect()) > 0.0 || viewport.rect().contains_edge(rect.top)) {
                continue;
            }
            let offset = rect.top - viewport.scroll_y;
            if offset < 0.0 {
                continue;
            }
            let row = (offset / px_per_row) as usize;
            let Some(line) = lines.get_mut(row) else {
                continue;
            };
            if let Some(element) = doc.get(el) {
                let depth = doc.ancestors_inclusive(el).len().saturating_sub(2);
                let label = describe(element);
                if !line.text.is_empty() {
                    line.text.push_str("  ");
                } else {
                    line.text.push_str(&"  ".repeat(depth));
                }
                line.text.push_str(&label);
                line.elements.push(el);
            }
        }

        for line in &mut lines {
            line.text = truncate(&line.text, columns);
        }
        lines
    })
}

/// One-line label: `tag#id .classes  text [value]`.
pub fn describe(element: &Element) -> String {
    let mut label = element.tag.clone();
    if let Some(id) = &element.id {
        label.push('#');
        label.push_str(id);
    }
    for name in element.classes.names() {
        label.push_str(" .");
        label.push_str(name);
    }
    for name in &element.extra_classes {
        label.push_str(" .");
        label.push_str(name);
    }

    let text = strip_markup(element.text.lines().next().unwrap_or_default());
    if !text.is_empty() {
        label.push_str("  ");
        label.push_str(&text);
    }
    if matches!(element.tag.as_str(), "input" | "textarea" | "select") {
        label.push_str(&format!(" [{}]", element.value));
    }
    label
}

/// Drop `<...>` tags, keeping the text between them.
pub fn strip_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Cut `s` to at most `width` terminal cells, ending in `…` when cut.
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Id of the section at the scroll offset, for status lines.
pub fn top_section(doc: &mut Document, scroll_y: f32) -> Option<String> {
    let probe = Rect::new(scroll_y, 1.0);
    let section = doc
        .sections_with_id()
        .into_iter()
        .filter(|s| doc.bounding_rect(*s).overlap(&probe) > 0.0)
        .last()?;
    doc.get(section).and_then(|el| el.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::VirtualScheduler;
    use crate::types::{ClassSet, Viewport};
    use std::rc::Rc;

    fn setup() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(body, Element::new("nav").id("navbar").height(48.0));
        doc.append(nav, Element::new("a").class("nav-link").text("Home"));
        doc.append(body, Element::new("section").id("home").height(400.0));
        let about = doc.append(body, Element::new("section").id("about").height(800.0));
        doc.append(about, Element::new("h2").class("reveal").text("About <em>me</em>"));
        Page::new(doc, Rc::new(VirtualScheduler::new()), Viewport::new(400.0, 480.0))
    }

    #[test]
    fn test_rows_follow_element_tops() {
        let page = setup();
        let lines = render_viewport(&page, 20, 24.0);
        assert_eq!(lines.len(), 20);
        assert!(lines[0].text.starts_with("nav#navbar"));
        assert!(lines[0].text.contains("a .nav-link  Home"));
        assert!(lines[2].text.starts_with("section#home"));
        assert!(lines[3].is_blank());
        // about at 448
        assert!(lines[18].text.starts_with("section#about"));
        assert!(lines[18].text.contains("h2 .reveal  About me"));
    }

    #[test]
    fn test_scroll_shifts_rows() {
        let page = setup();
        page.scroll_to(448.0);
        let lines = render_viewport(&page, 10, 24.0);
        assert!(lines[0].text.starts_with("section#about"));
        assert!(lines.iter().all(|l| !l.text.contains("navbar")));
    }

    #[test]
    fn test_class_markers_reflect_state() {
        let page = setup();
        let nav = page.get_element_by_id("navbar").unwrap();
        page.update_document(|doc| doc.add_class(nav, ClassSet::SCROLLED));
        let lines = render_viewport(&page, 1, 24.0);
        assert!(lines[0].text.starts_with("nav#navbar .scrolled"));
    }

    #[test]
    fn test_truncate_by_cell_width() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<span>Message Sent!</span><svg><polyline/></svg>"), "Message Sent!");
        assert_eq!(strip_markup("a < b"), "a ");
    }

    #[test]
    fn test_top_section() {
        let page = setup();
        assert_eq!(page.measure(|doc| top_section(doc, 100.0)).as_deref(), Some("home"));
        assert_eq!(page.measure(|doc| top_section(doc, 0.0)), None);
    }
}
