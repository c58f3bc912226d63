//! Navbar - `scrolled` style once the page leaves the top.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::NavbarConfig;
use crate::engine::{EventKind, Page};
use crate::error::{Error, Result};
use crate::types::{ClassSet, ElementId};

use super::Cleanup;

pub const NAME: &str = "navbar";

pub struct NavbarWatcher {
    navbar: ElementId,
    threshold: f32,
    /// Offset seen by the last update.
    last_offset: Cell<f32>,
}

impl NavbarWatcher {
    pub fn new(navbar: ElementId, threshold: f32) -> Self {
        Self {
            navbar,
            threshold,
            last_offset: Cell::new(0.0),
        }
    }

    pub fn attach(page: &Page, config: &NavbarConfig) -> Result<Cleanup> {
        let navbar = page
            .get_element_by_id(&config.navbar_id)
            .ok_or_else(|| Error::missing(NAME, format!("#{}", config.navbar_id)))?;

        let watcher = Rc::new(Self::new(navbar, config.scroll_threshold));
        // A page restored mid-scroll starts styled correctly.
        watcher.update(page, page.scroll_y());

        let w = watcher.clone();
        let listener = page.add_window_listener(EventKind::Scroll, move |page, _| {
            w.update(page, page.scroll_y());
        });

        let page = page.downgrade();
        Ok(Box::new(move || {
            if let Some(page) = page.upgrade() {
                page.remove_listener(listener);
            }
        }))
    }

    /// `scrolled` exactly when `offset` is strictly past the threshold.
    pub fn update(&self, page: &Page, offset: f32) {
        let scrolled = offset > self.threshold;
        if page.document().has_class(self.navbar, ClassSet::SCROLLED) != scrolled {
            page.update_document(|doc| doc.set_class(self.navbar, ClassSet::SCROLLED, scrolled));
        }
        self.last_offset.set(offset);
    }

    pub fn last_offset(&self) -> f32 {
        self.last_offset.get()
    }
}
