//! Typewriter - Types and deletes a cycle of phrases
//!
//! The cycle is a pure state machine ([`TypewriterState::tick`]) that returns
//! the delay before the next tick; [`Typewriter`] drives it through the page
//! scheduler one timeout at a time, so ticks never overlap.
//!
//! Per tick, one grapheme is typed or deleted, then:
//!
//! - typing and the phrase is complete → hold (2000ms), switch to deleting
//! - deleting and the text is empty → next phrase (wrapping), hold (400ms)
//! - otherwise → 80ms while typing, 40ms while deleting

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spark_signals::{Signal, signal};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TypewriterConfig;
use crate::engine::{Page, TimerId};
use crate::error::{Error, Result};
use crate::types::ElementId;

use super::Cleanup;

pub const NAME: &str = "typewriter";

// =============================================================================
// PHRASES
// =============================================================================

/// Non-empty, immutable, cyclic list of phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseList {
    phrases: Vec<String>,
    /// Grapheme count per phrase.
    lengths: Vec<usize>,
}

impl PhraseList {
    /// Empty phrases are dropped; nothing left is an error.
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect();
        if phrases.is_empty() {
            return Err(Error::EmptyPhraseList);
        }
        let lengths = phrases.iter().map(|p| p.graphemes(true).count()).collect();
        Ok(Self { phrases, lengths })
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Phrase at `index`, wrapping around.
    pub fn get(&self, index: usize) -> &str {
        &self.phrases[index % self.phrases.len()]
    }

    /// Length of phrase `index` in graphemes.
    pub fn char_len(&self, index: usize) -> usize {
        self.lengths[index % self.lengths.len()]
    }

    /// First `count` graphemes of phrase `index`.
    pub fn prefix(&self, index: usize, count: usize) -> &str {
        let phrase = self.get(index);
        match phrase.grapheme_indices(true).nth(count) {
            Some((end, _)) => &phrase[..end],
            None => phrase,
        }
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Typing,
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypewriterTimings {
    pub typing: Duration,
    pub deleting: Duration,
    pub hold_full: Duration,
    pub hold_empty: Duration,
}

impl Default for TypewriterTimings {
    fn default() -> Self {
        Self::from(&TypewriterConfig::default())
    }
}

impl From<&TypewriterConfig> for TypewriterTimings {
    fn from(config: &TypewriterConfig) -> Self {
        Self {
            typing: Duration::from_millis(config.typing_ms),
            deleting: Duration::from_millis(config.deleting_ms),
            hold_full: Duration::from_millis(config.hold_full_ms),
            hold_empty: Duration::from_millis(config.hold_empty_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypewriterState {
    pub phrase_index: usize,
    /// Graphemes of the current phrase on screen.
    pub char_count: usize,
    pub direction: Direction,
    /// Delay computed by the last tick.
    pub pending_delay: Duration,
}

impl Default for TypewriterState {
    fn default() -> Self {
        Self {
            phrase_index: 0,
            char_count: 0,
            direction: Direction::Typing,
            pending_delay: Duration::ZERO,
        }
    }
}

impl TypewriterState {
    /// Type or delete one grapheme, apply the boundary rules and return the
    /// delay before the next tick.
    pub fn tick(&mut self, phrases: &PhraseList, timings: &TypewriterTimings) -> Duration {
        let len = phrases.char_len(self.phrase_index);

        let mut delay = match self.direction {
            Direction::Typing => {
                self.char_count = (self.char_count + 1).min(len);
                timings.typing
            }
            Direction::Deleting => {
                self.char_count = self.char_count.saturating_sub(1);
                timings.deleting
            }
        };

        if self.direction == Direction::Typing && self.char_count == len {
            delay = timings.hold_full;
            self.direction = Direction::Deleting;
        } else if self.direction == Direction::Deleting && self.char_count == 0 {
            self.direction = Direction::Typing;
            self.phrase_index = (self.phrase_index + 1) % phrases.len();
            delay = timings.hold_empty;
        }

        self.pending_delay = delay;
        delay
    }

    /// Text currently on screen for this state.
    pub fn visible_text<'a>(&self, phrases: &'a PhraseList) -> &'a str {
        phrases.prefix(self.phrase_index, self.char_count)
    }
}

// =============================================================================
// BEHAVIOR
// =============================================================================

/// Drives a [`TypewriterState`] into an output element.
pub struct Typewriter {
    output: ElementId,
    phrases: PhraseList,
    timings: TypewriterTimings,
    state: RefCell<TypewriterState>,
    timer: Cell<Option<TimerId>>,
    text: Signal<String>,
}

impl Typewriter {
    pub fn new(output: ElementId, phrases: PhraseList, timings: TypewriterTimings) -> Self {
        Self {
            output,
            phrases,
            timings,
            state: RefCell::new(TypewriterState::default()),
            timer: Cell::new(None),
            text: signal(String::new()),
        }
    }

    /// Find the output element, validate the phrases and start typing.
    pub fn attach(page: &Page, config: &TypewriterConfig) -> Result<Cleanup> {
        Self::attach_with_handle(page, config).map(|(_, cleanup)| cleanup)
    }

    /// Like [`Typewriter::attach`], also returning the running typewriter.
    pub fn attach_with_handle(page: &Page, config: &TypewriterConfig) -> Result<(Rc<Self>, Cleanup)> {
        let output = page
            .get_element_by_id(&config.target_id)
            .ok_or_else(|| Error::missing(NAME, format!("#{}", config.target_id)))?;
        let phrases = PhraseList::new(config.phrases.iter().cloned())?;

        let typewriter = Rc::new(Self::new(output, phrases, TypewriterTimings::from(config)));
        let cleanup = typewriter.start(page);
        Ok((typewriter, cleanup))
    }

    /// Run the first tick now and keep rescheduling until cleaned up.
    pub fn start(self: &Rc<Self>, page: &Page) -> Cleanup {
        self.run_tick(page);

        let this = self.clone();
        let scheduler = page.scheduler();
        Box::new(move || {
            if let Some(id) = this.timer.take() {
                scheduler.clear_timeout(id);
            }
        })
    }

    pub fn state(&self) -> TypewriterState {
        *self.state.borrow()
    }

    /// Reactive view of the typed text.
    pub fn text_signal(&self) -> Signal<String> {
        self.text.clone()
    }

    fn run_tick(self: &Rc<Self>, page: &Page) {
        let (delay, text) = {
            let mut state = self.state.borrow_mut();
            let delay = state.tick(&self.phrases, &self.timings);
            (delay, state.visible_text(&self.phrases).to_string())
        };
        tracing::trace!(?delay, text = %text, "typewriter tick");

        let output = self.output;
        page.update_document(|doc| doc.set_text(output, text.clone()));
        self.text.set(text);

        let this = self.clone();
        let weak = page.downgrade();
        let id = page.scheduler().set_timeout(
            delay,
            Box::new(move || {
                if let Some(page) = weak.upgrade() {
                    this.run_tick(&page);
                }
            }),
        );
        self.timer.set(Some(id));
    }
}
