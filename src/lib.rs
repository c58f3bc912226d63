//! # folio-fx
//!
//! Interaction layer of a single-page portfolio site, as a Rust library.
//!
//! Eight independent behaviors run against one shared page view:
//!
//! - a typewriter cycling through role phrases
//! - a navbar that restyles once the page scrolls
//! - a mobile menu toggle holding a body scroll lock
//! - nav link highlighting for the section in view
//! - one-shot reveal of elements entering the viewport
//! - one-shot count-up animation of stat numbers
//! - a contact form that acknowledges instead of submitting
//! - smooth scrolling for in-page anchor links
//!
//! ## Architecture
//!
//! ```text
//! Document (element arena) ── taffy layout ──► offsets, content height
//!        │
//!      Page ◄── Scheduler (timers + animation frames, injectable)
//!        │  events (scroll / click / submit), intersection observers
//!        ▼
//!   behaviors::* ── attach(page, config) -> Cleanup
//! ```
//!
//! Time is never read from the OS inside the library: every delay goes through
//! the page's [`Scheduler`]. Tests and the terminal host both use
//! [`VirtualScheduler`], advanced explicitly.
//!
//! ## Modules
//!
//! - [`types`] - Element ids, class flags, geometry, observer options
//! - [`engine`] - Document, page, events, scheduler, observers, scrolling
//! - [`layout`] - Taffy bridge computing element offsets
//! - [`behaviors`] - The eight interaction state machines
//! - [`template`] - The reference portfolio document
//! - [`renderer`] - Text preview and crossterm terminal host
//! - [`config`] - TOML configuration
//! - [`error`] - Error type
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use folio_fx::{behaviors, template, Page, PageConfig, Viewport, VirtualScheduler};
//!
//! let config = PageConfig::default();
//! let scheduler = Rc::new(VirtualScheduler::new());
//! let page = Page::new(template::portfolio_document(&config), scheduler.clone(), Viewport::default());
//! let interactions = behaviors::attach_all(&page, &config);
//!
//! page.scroll_to(900.0);
//! scheduler.run_frames(120);
//! interactions.detach();
//! ```

pub mod behaviors;
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod template;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::PageConfig;
pub use error::{Error, Result};

pub use engine::{
    Document, Element, Event, EventKind, IntersectionEntry, IntersectionObserver, ListenerId,
    Page, Scheduler, VirtualScheduler, WeakPage,
};

pub use behaviors::{Cleanup, Interactions, attach_all};

pub use layout::{ComputedLayout, compute_layout};

pub use renderer::{PreviewLine, render_viewport};
