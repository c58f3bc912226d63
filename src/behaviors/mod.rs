//! Behaviors - The page's independent interaction state machines
//!
//! - **Typewriter** - types and deletes a cycle of phrases
//! - **Navbar** - `scrolled` style past a scroll threshold
//! - **Menu** - mobile menu toggle with body scroll lock
//! - **Active section** - highlights the nav link of the section in view
//! - **Reveal** - one-shot fade-in when an element enters the viewport
//! - **Counter** - one-shot count-up animation for stat numbers
//! - **Contact form** - intercepted submit with a timed acknowledgment
//! - **Anchors** - smooth scrolling for in-page links
//!
//! Each behavior owns its state, exposes `attach(page, config)` and returns a
//! [`Cleanup`] that removes its listeners and observers and cancels its
//! pending timers and frames. None of them knows about the others.
//!
//! # Example
//!
//! ```ignore
//! let interactions = behaviors::attach_all(&page, &PageConfig::default());
//! for (name, err) in interactions.skipped() {
//!     eprintln!("{name} disabled: {err}");
//! }
//! // ... page runs ...
//! interactions.detach();
//! ```

pub mod active_section;
pub mod anchors;
pub mod contact_form;
pub mod counter;
pub mod menu;
pub mod navbar;
pub mod reveal;
pub mod typewriter;

pub use active_section::ActiveSectionTracker;
pub use anchors::AnchorScroller;
pub use contact_form::ContactForm;
pub use counter::{CounterAnimator, CounterFrame, CounterState};
pub use menu::MobileMenu;
pub use navbar::NavbarWatcher;
pub use reveal::RevealTrigger;
pub use typewriter::{Direction, PhraseList, Typewriter, TypewriterState, TypewriterTimings};

use spark_signals::Signal;

use crate::config::PageConfig;
use crate::engine::Page;
use crate::error::{Error, Result};

/// Cleanup function returned by every `attach`.
pub type Cleanup = Box<dyn FnOnce()>;

/// The set of behaviors attached to a page.
#[derive(Default)]
pub struct Interactions {
    attached: Vec<(&'static str, Cleanup)>,
    skipped: Vec<(&'static str, Error)>,
    typewriter_text: Option<Signal<String>>,
}

impl Interactions {
    /// Record the outcome of one `attach`. Failures are logged, not fatal.
    pub fn add(&mut self, name: &'static str, result: Result<Cleanup>) {
        match result {
            Ok(cleanup) => {
                tracing::debug!(behavior = name, "attached");
                self.attached.push((name, cleanup));
            }
            Err(err) => {
                tracing::warn!(behavior = name, error = %err, "behavior skipped");
                self.skipped.push((name, err));
            }
        }
    }

    /// Names of the attached behaviors, in attach order.
    pub fn attached(&self) -> Vec<&'static str> {
        self.attached.iter().map(|(name, _)| *name).collect()
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.attached.iter().any(|(n, _)| *n == name)
    }

    /// Behaviors that could not attach, with the reason.
    pub fn skipped(&self) -> &[(&'static str, Error)] {
        &self.skipped
    }

    /// Text currently shown by the typewriter, if it attached.
    pub fn typewriter_text(&self) -> Option<Signal<String>> {
        self.typewriter_text.clone()
    }

    /// Run every cleanup, newest first.
    pub fn detach(self) {
        for (name, cleanup) in self.attached.into_iter().rev() {
            cleanup();
            tracing::debug!(behavior = name, "detached");
        }
    }
}

/// Attach every behavior to `page`. A behavior whose element is missing or
/// whose configuration is unusable is skipped; the rest still run.
pub fn attach_all(page: &Page, config: &PageConfig) -> Interactions {
    let mut interactions = Interactions::default();
    let typewriter = Typewriter::attach_with_handle(page, &config.typewriter).map(|(typewriter, cleanup)| {
        interactions.typewriter_text = Some(typewriter.text_signal());
        cleanup
    });
    interactions.add(typewriter::NAME, typewriter);
    interactions.add(navbar::NAME, NavbarWatcher::attach(page, &config.navbar));
    interactions.add(menu::NAME, MobileMenu::attach(page, &config.menu));
    interactions.add(active_section::NAME, ActiveSectionTracker::attach(page, &config.sections));
    interactions.add(reveal::NAME, RevealTrigger::attach(page, &config.reveal));
    interactions.add(counter::NAME, CounterAnimator::attach(page, &config.counters));
    interactions.add(contact_form::NAME, ContactForm::attach(page, &config.contact));
    interactions.add(anchors::NAME, AnchorScroller::attach(page, &config.anchors));
    interactions
}
