//! Anchors - Smooth scrolling for `a[href^="#"]` links.
//!
//! Links are collected once at attach time. A click never navigates: it
//! smooth-scrolls to the referenced element, or does nothing when the
//! fragment resolves to no element (including a bare `#`).

use std::rc::Rc;
use std::time::Duration;

use crate::config::AnchorConfig;
use crate::engine::{Event, EventKind, Page};
use crate::error::Result;
use crate::types::ElementId;

use super::Cleanup;

pub const NAME: &str = "anchors";

pub struct AnchorScroller {
    duration: Duration,
}

impl AnchorScroller {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn attach(page: &Page, config: &AnchorConfig) -> Result<Cleanup> {
        let scroller = Rc::new(Self::new(config.smooth_duration()));
        let anchors = page.document().fragment_anchors();
        tracing::debug!(count = anchors.len(), "anchor links");

        let listeners: Vec<_> = anchors
            .into_iter()
            .map(|anchor| {
                let s = scroller.clone();
                page.add_listener(anchor, EventKind::Click, move |page, event| {
                    s.on_click(page, anchor, event);
                })
            })
            .collect();

        let page = page.downgrade();
        Ok(Box::new(move || {
            if let Some(page) = page.upgrade() {
                for id in listeners {
                    page.remove_listener(id);
                }
            }
        }))
    }

    fn on_click(&self, page: &Page, anchor: ElementId, event: &mut Event) {
        event.prevent_default();

        let target = {
            let doc = page.document();
            doc.attribute(anchor, "href")
                .and_then(|href| doc.resolve_fragment(href))
        };
        match target {
            Some(target) => {
                let y = page.scroll_target(target);
                tracing::debug!(%anchor, %target, y, "anchor scroll");
                page.smooth_scroll_to(y, self.duration);
            }
            None => tracing::debug!(%anchor, "anchor target not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Document, Element, VirtualScheduler};
    use crate::types::Viewport;

    struct Fixture {
        page: Page,
        sched: Rc<VirtualScheduler>,
        to_about: ElementId,
        to_nowhere: ElementId,
        bare: ElementId,
        external: ElementId,
    }

    fn setup() -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(body, Element::new("nav").height(60.0));
        let to_about = doc.append(nav, Element::new("a").attr("href", "#about"));
        let to_nowhere = doc.append(nav, Element::new("a").attr("href", "#missing"));
        let bare = doc.append(nav, Element::new("a").attr("href", "#"));
        let external = doc.append(nav, Element::new("a").attr("href", "https://example.com"));
        doc.append(body, Element::new("section").id("home").height(900.0));
        doc.append(body, Element::new("section").id("about").height(900.0));
        let sched = Rc::new(VirtualScheduler::new());
        let page = Page::new(doc, sched.clone(), Viewport::new(1280.0, 800.0));
        Fixture {
            page,
            sched,
            to_about,
            to_nowhere,
            bare,
            external,
        }
    }

    #[test]
    fn test_click_smooth_scrolls_to_target() {
        let f = setup();
        let _cleanup = AnchorScroller::attach(&f.page, &AnchorConfig::default()).unwrap();

        assert!(!f.page.click(f.to_about));
        assert_eq!(f.page.scroll_y(), 0.0);
        assert!(f.page.is_smooth_scrolling());

        f.sched.run_frames(40);
        assert_eq!(f.page.scroll_y(), 960.0);
    }

    #[test]
    fn test_unresolved_fragments_do_nothing() {
        let f = setup();
        let _cleanup = AnchorScroller::attach(&f.page, &AnchorConfig::default()).unwrap();

        assert!(!f.page.click(f.to_nowhere));
        assert!(!f.page.click(f.bare));
        f.sched.run_frames(40);
        assert_eq!(f.page.scroll_y(), 0.0);
    }

    #[test]
    fn test_non_fragment_links_untouched() {
        let f = setup();
        let _cleanup = AnchorScroller::attach(&f.page, &AnchorConfig::default()).unwrap();
        assert!(f.page.click(f.external));
        assert_eq!(f.page.listener_count(), 3);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let f = setup();
        let config = AnchorConfig { smooth_duration_ms: 0 };
        let _cleanup = AnchorScroller::attach(&f.page, &config).unwrap();
        f.page.click(f.to_about);
        assert_eq!(f.page.scroll_y(), 960.0);
    }
}
