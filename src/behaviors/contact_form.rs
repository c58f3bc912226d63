//! Contact Form - Intercept submission and acknowledge it on the submit button
//!
//! On submit the host's default submission is prevented, the form's first
//! `.btn` shows a "sent" label over a success background, and after the
//! revert delay the button gets its original content back and every field
//! of the form is cleared.
//!
//! Submitting again while the acknowledgment is showing restarts the delay;
//! the content restored is still the one captured before the first submit.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::ContactConfig;
use crate::engine::{Event, EventKind, Page, TimerId};
use crate::error::{Error, Result};
use crate::types::{ClassSet, ElementId};

use super::Cleanup;

pub const NAME: &str = "contact-form";

const CHECKMARK_SVG: &str = r#"<svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polyline points="20 6 9 17 4 12"></polyline></svg>"#;

/// Button markup shown while a submission is acknowledged.
pub fn sent_markup(label: &str) -> String {
    format!("<span>{label}</span>{CHECKMARK_SVG}")
}

struct PendingRevert {
    button: ElementId,
    original: String,
    timer: TimerId,
}

pub struct ContactForm {
    form: ElementId,
    revert_after: Duration,
    sent_markup: String,
    sent_background: String,
    pending: RefCell<Option<PendingRevert>>,
}

impl ContactForm {
    pub fn new(form: ElementId, config: &ContactConfig) -> Self {
        Self {
            form,
            revert_after: Duration::from_millis(config.revert_ms),
            sent_markup: sent_markup(&config.sent_label),
            sent_background: config.sent_background.clone(),
            pending: RefCell::new(None),
        }
    }

    pub fn attach(page: &Page, config: &ContactConfig) -> Result<Cleanup> {
        let form = page
            .get_element_by_id(&config.form_id)
            .ok_or_else(|| Error::missing(NAME, format!("#{}", config.form_id)))?;

        let this = Rc::new(Self::new(form, config));
        let t = this.clone();
        let listener = page.add_listener(form, EventKind::Submit, move |page, event| t.on_submit(page, event));

        let page = page.downgrade();
        Ok(Box::new(move || {
            if let Some(page) = page.upgrade() {
                page.remove_listener(listener);
                // Leave the button as it was found.
                this.revert(&page);
            }
        }))
    }

    /// An acknowledgment is on screen.
    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    fn on_submit(self: &Rc<Self>, page: &Page, event: &mut Event) {
        event.prevent_default();

        let Some(button) = page.document().first_class_within(self.form, ClassSet::BTN) else {
            tracing::warn!(form = %self.form, "contact form has no .btn to acknowledge on");
            return;
        };

        let scheduler = page.scheduler();
        let previous = self.pending.borrow_mut().take();
        let original = match previous {
            Some(pending) => {
                scheduler.clear_timeout(pending.timer);
                pending.original
            }
            None => page.document().text(button).unwrap_or_default().to_owned(),
        };

        page.update_document(|doc| {
            doc.set_text(button, self.sent_markup.clone());
            doc.set_background(button, Some(self.sent_background.clone()));
        });

        let this = self.clone();
        let weak = page.downgrade();
        let timer = scheduler.set_timeout(
            self.revert_after,
            Box::new(move || {
                if let Some(page) = weak.upgrade() {
                    this.revert(&page);
                }
            }),
        );
        tracing::debug!(%button, "contact form acknowledged");

        *self.pending.borrow_mut() = Some(PendingRevert {
            button,
            original,
            timer,
        });
    }

    fn revert(&self, page: &Page) {
        let Some(pending) = self.pending.borrow_mut().take() else {
            return;
        };
        page.scheduler().clear_timeout(pending.timer);

        let form = self.form;
        page.update_document(|doc| {
            doc.set_text(pending.button, pending.original);
            doc.set_background(pending.button, None);
            for field in doc.form_fields(form) {
                doc.set_value(field, "");
            }
        });
        tracing::debug!(%form, "contact form reset");
    }
}
