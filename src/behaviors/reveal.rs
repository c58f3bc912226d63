//! Reveal - One-shot `visible` style for `.reveal` elements.
//!
//! Observed at 10% visibility with the viewport's bottom edge pulled up by
//! 60px. Once revealed an element is unobserved and never hidden again.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::config::RevealConfig;
use crate::engine::{IntersectionEntry, IntersectionObserver, Page};
use crate::error::Result;
use crate::types::{ClassSet, ElementId, ObserverOptions, RootMargin};

use super::Cleanup;

pub const NAME: &str = "reveal";

#[derive(Default)]
pub struct RevealTrigger {
    revealed: RefCell<HashSet<ElementId>>,
}

impl RevealTrigger {
    pub fn attach(page: &Page, config: &RevealConfig) -> Result<Cleanup> {
        config.validate()?;
        let targets = page.document().query_class(ClassSet::REVEAL);
        tracing::debug!(count = targets.len(), "reveal targets");

        let trigger = Rc::new(Self::default());
        let options = ObserverOptions::new(config.threshold)
            .with_root_margin(RootMargin::bottom_inset(config.bottom_margin));
        let t = trigger.clone();
        let observer = page.create_observer(options, move |page, entries, observer| {
            t.on_entries(page, entries, observer);
        });
        for target in targets {
            observer.observe(target);
        }

        Ok(Box::new(move || observer.disconnect()))
    }

    pub fn is_revealed(&self, el: ElementId) -> bool {
        self.revealed.borrow().contains(&el)
    }

    fn on_entries(&self, page: &Page, entries: &[IntersectionEntry], observer: &IntersectionObserver) {
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            observer.unobserve(entry.target);
            if !self.revealed.borrow_mut().insert(entry.target) {
                continue;
            }
            page.update_document(|doc| doc.add_class(entry.target, ClassSet::VISIBLE));
        }
    }
}
