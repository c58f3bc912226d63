//! Mobile Menu - Toggle control, open state and body scroll lock
//!
//! The toggle's `active` style, the menu's `open` style and the body scroll
//! lock always move together: the lock is held exactly while the menu is open.
//! Clicking any `.nav-link` inside the menu closes it.

use std::rc::Rc;

use crate::config::MenuConfig;
use crate::engine::{EventKind, ListenerId, Page};
use crate::error::{Error, Result};
use crate::types::{ClassSet, ElementId, Overflow};

use super::Cleanup;

pub const NAME: &str = "menu";

pub struct MobileMenu {
    toggle: ElementId,
    menu: ElementId,
}

impl MobileMenu {
    pub fn new(toggle: ElementId, menu: ElementId) -> Self {
        Self { toggle, menu }
    }

    pub fn attach(page: &Page, config: &MenuConfig) -> Result<Cleanup> {
        let toggle = page
            .get_element_by_id(&config.toggle_id)
            .ok_or_else(|| Error::missing(NAME, format!("#{}", config.toggle_id)))?;
        let menu = page
            .get_element_by_id(&config.menu_id)
            .ok_or_else(|| Error::missing(NAME, format!("#{}", config.menu_id)))?;

        let this = Rc::new(Self::new(toggle, menu));
        let mut listeners: Vec<ListenerId> = Vec::new();

        let m = this.clone();
        listeners.push(page.add_listener(toggle, EventKind::Click, move |page, _| m.toggle(page)));

        let links = page.document().query_class_within(menu, ClassSet::NAV_LINK);
        for link in links {
            let m = this.clone();
            listeners.push(page.add_listener(link, EventKind::Click, move |page, _| m.close(page)));
        }

        let page = page.downgrade();
        Ok(Box::new(move || {
            if let Some(page) = page.upgrade() {
                for id in listeners {
                    page.remove_listener(id);
                }
            }
        }))
    }

    pub fn is_open(&self, page: &Page) -> bool {
        page.document().has_class(self.menu, ClassSet::OPEN)
    }

    pub fn toggle(&self, page: &Page) {
        let open = !self.is_open(page);
        self.set_open(page, open);
    }

    pub fn open(&self, page: &Page) {
        self.set_open(page, true);
    }

    pub fn close(&self, page: &Page) {
        self.set_open(page, false);
    }

    fn set_open(&self, page: &Page, open: bool) {
        tracing::debug!(open, "mobile menu");
        page.update_document(|doc| {
            doc.set_class(self.toggle, ClassSet::ACTIVE, open);
            doc.set_class(self.menu, ClassSet::OPEN, open);
            doc.set_body_overflow(if open { Overflow::Hidden } else { Overflow::Visible });
        });
    }
}
