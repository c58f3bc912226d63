//! Active Section - Highlight the nav link of the section under the scroll offset.
//!
//! A section matches when `top - offset <= y < top - offset + height`. Sections
//! and links are queried on every scroll, so late additions are picked up.
//! When no section matches the previous highlight stays.

use std::rc::Rc;

use crate::config::SectionConfig;
use crate::engine::{Document, EventKind, Page};
use crate::error::Result;
use crate::types::ClassSet;

use super::Cleanup;

pub const NAME: &str = "active-section";

pub struct ActiveSectionTracker {
    offset: f32,
}

impl ActiveSectionTracker {
    pub fn new(offset: f32) -> Self {
        Self { offset }
    }

    pub fn attach(page: &Page, config: &SectionConfig) -> Result<Cleanup> {
        let tracker = Rc::new(Self::new(config.offset));
        let t = tracker.clone();
        let listener = page.add_window_listener(EventKind::Scroll, move |page, _| {
            t.update(page, page.scroll_y());
        });

        let page = page.downgrade();
        Ok(Box::new(move || {
            if let Some(page) = page.upgrade() {
                page.remove_listener(listener);
            }
        }))
    }

    /// Id of the section matching `y`. With overlapping sections the last one
    /// in document order wins.
    pub fn matching_section(&self, doc: &mut Document, y: f32) -> Option<String> {
        let mut current = None;
        for section in doc.sections_with_id() {
            let top = doc.offset_top(section) - self.offset;
            let height = doc.offset_height(section);
            if y >= top && y < top + height {
                current = doc.get(section).and_then(|el| el.id.clone());
            }
        }
        current
    }

    pub fn update(&self, page: &Page, y: f32) {
        let Some(id) = page.measure(|doc| self.matching_section(doc, y)) else {
            return;
        };

        let href = format!("#{id}");
        let changed = {
            let doc = page.document();
            doc.query_class(ClassSet::NAV_LINK).into_iter().any(|link| {
                let matches = doc.attribute(link, "href") == Some(href.as_str());
                doc.has_class(link, ClassSet::ACTIVE) != matches
            })
        };
        if !changed {
            return;
        }

        tracing::debug!(section = %id, "active section");
        page.update_document(|doc| {
            for link in doc.query_class(ClassSet::NAV_LINK) {
                let matches = doc.attribute(link, "href") == Some(href.as_str());
                doc.set_class(link, ClassSet::ACTIVE, matches);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Element, VirtualScheduler};
    use crate::types::{ElementId, Viewport};

    fn setup() -> (Page, Vec<ElementId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(body, Element::new("nav").height(80.0));
        let links = ["#home", "#about", "#contact"]
            .iter()
            .map(|href| doc.append(nav, Element::new("a").class("nav-link").attr("href", *href)))
            .collect();
        // home 80..880, about 880..1480, contact 1480..2480
        doc.append(body, Element::new("section").id("home").height(800.0));
        doc.append(body, Element::new("section").id("about").height(600.0));
        doc.append(body, Element::new("section").id("contact").height(1000.0));
        let page = Page::new(doc, Rc::new(VirtualScheduler::new()), Viewport::new(1280.0, 800.0));
        (page, links)
    }

    fn active(page: &Page, links: &[ElementId]) -> Vec<bool> {
        let doc = page.document();
        links.iter().map(|l| doc.has_class(*l, ClassSet::ACTIVE)).collect()
    }

    #[test]
    fn test_bounds_apply_offset() {
        let (page, _) = setup();
        let tracker = ActiveSectionTracker::new(120.0);
        page.measure(|doc| {
            // about starts at 880 - 120 = 760
            assert_eq!(tracker.matching_section(doc, 759.0).as_deref(), Some("home"));
            assert_eq!(tracker.matching_section(doc, 760.0).as_deref(), Some("about"));
            assert_eq!(tracker.matching_section(doc, 1359.0).as_deref(), Some("about"));
            assert_eq!(tracker.matching_section(doc, 1360.0).as_deref(), Some("contact"));
            // above the first section's shifted top
            assert_eq!(tracker.matching_section(doc, -50.0), None);
        });
    }

    #[test]
    fn test_exactly_one_link_active() {
        let (page, links) = setup();
        let _cleanup = ActiveSectionTracker::attach(&page, &SectionConfig::default()).unwrap();

        page.scroll_to(800.0);
        assert_eq!(active(&page, &links), vec![false, true, false]);
        page.scroll_to(1400.0);
        assert_eq!(active(&page, &links), vec![false, false, true]);
        page.scroll_to(10.0);
        assert_eq!(active(&page, &links), vec![true, false, false]);
    }

    #[test]
    fn test_no_match_keeps_previous_highlight() {
        let (page, links) = setup();
        let tracker = ActiveSectionTracker::new(120.0);
        tracker.update(&page, 800.0);
        tracker.update(&page, 5000.0);
        assert_eq!(active(&page, &links), vec![false, true, false]);
    }

    #[test]
    fn test_unchanged_highlight_skips_update() {
        let (page, _) = setup();
        let tracker = ActiveSectionTracker::new(120.0);
        tracker.update(&page, 800.0);
        let revision = page.revision();
        tracker.update(&page, 810.0);
        assert_eq!(page.revision(), revision);
    }
}
