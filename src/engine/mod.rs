//! Engine - The host view the behaviors run against
//!
//! [`Page`] is the single shared view: it owns the [`Document`], the viewport,
//! the listener registry, the intersection observers and the injected
//! [`Scheduler`]. Behaviors never talk to each other, only to the page.
//!
//! Everything is single-threaded and cooperative. The page never holds a
//! borrow of its own state while calling out to a handler, observer callback
//! or scheduled task, so any of those may freely call back into the page.
//!
//! # Example
//!
//! ```ignore
//! let scheduler = Rc::new(VirtualScheduler::new());
//! let page = Page::new(document, scheduler.clone(), Viewport::new(1280.0, 800.0));
//!
//! page.add_window_listener(EventKind::Scroll, |page, _event| {
//!     println!("scrolled to {}", page.scroll_y());
//! });
//! page.scroll_to(400.0);
//! ```

mod document;
mod events;
mod observer;
mod scheduler;
mod scroll;

pub use document::*;
pub use events::{Event, EventHandler, EventKind, ListenerId};
pub use observer::*;
pub use scheduler::*;
pub use scroll::*;

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{Signal, signal};

use crate::types::{ElementId, ObserverOptions, Viewport};

use events::ListenerRegistry;

// =============================================================================
// PAGE
// =============================================================================

struct PageInner {
    document: RefCell<Document>,
    scheduler: Rc<dyn Scheduler>,
    listeners: RefCell<ListenerRegistry>,
    observers: RefCell<Vec<IntersectionObserver>>,
    /// Coalesced frame delivering initial observer entries.
    intersection_frame: Cell<Option<FrameId>>,
    viewport: Cell<Viewport>,
    /// Bumped to supersede an in-flight smooth scroll.
    scroll_generation: Cell<u64>,
    smooth_active: Cell<bool>,
    scroll_y: Signal<f32>,
    revision: Signal<u64>,
}

/// Shared handle to the page. Cheap to clone.
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

/// Non-owning page handle for scheduled tasks, so pending timers never keep
/// a torn-down page alive.
#[derive(Clone)]
pub struct WeakPage {
    inner: Weak<PageInner>,
}

impl WeakPage {
    pub fn upgrade(&self) -> Option<Page> {
        self.inner.upgrade().map(|inner| Page { inner })
    }
}

impl Page {
    pub fn new(mut document: Document, scheduler: Rc<dyn Scheduler>, viewport: Viewport) -> Self {
        document.set_layout_width(viewport.width);
        Self {
            inner: Rc::new(PageInner {
                document: RefCell::new(document),
                scheduler,
                listeners: RefCell::new(ListenerRegistry::default()),
                observers: RefCell::new(Vec::new()),
                intersection_frame: Cell::new(None),
                viewport: Cell::new(viewport),
                scroll_generation: Cell::new(0),
                smooth_active: Cell::new(false),
                scroll_y: signal(viewport.scroll_y),
                revision: signal(0),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakPage {
        WeakPage {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Page) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.inner.scheduler.clone()
    }

    // =========================================================================
    // Document access
    // =========================================================================

    /// Read-only view of the document.
    ///
    /// Do not hold the guard across calls that dispatch events.
    pub fn document(&self) -> Ref<'_, Document> {
        self.inner.document.borrow()
    }

    /// Mutate the document and bump the page revision.
    pub fn update_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let result = f(&mut self.inner.document.borrow_mut());
        self.bump_revision();
        result
    }

    /// Run a layout-dependent query (layout may be recomputed, which needs `&mut`).
    pub fn measure<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.inner.document.borrow_mut())
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.document().get_element_by_id(id)
    }

    /// Monotonic change counter; hosts redraw when it moves.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    pub fn revision_signal(&self) -> Signal<u64> {
        self.inner.revision.clone()
    }

    fn bump_revision(&self) {
        self.inner.revision.set(self.inner.revision.get() + 1);
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    pub fn viewport(&self) -> Viewport {
        self.inner.viewport.get()
    }

    /// Current vertical scroll offset (`window.scrollY`).
    pub fn scroll_y(&self) -> f32 {
        self.inner.viewport.get().scroll_y
    }

    pub fn scroll_signal(&self) -> Signal<f32> {
        self.inner.scroll_y.clone()
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f32 {
        let content = self.measure(|doc| doc.content_height());
        (content - self.viewport().height).max(0.0)
    }

    /// Change the viewport size; relayouts, re-clamps the offset and
    /// re-evaluates observers.
    pub fn resize(&self, width: f32, height: f32) {
        let mut viewport = self.viewport();
        viewport.width = width;
        viewport.height = height;
        self.inner.viewport.set(viewport);
        self.measure(|doc| doc.set_layout_width(width));
        self.bump_revision();

        let clamped = self.scroll_y().clamp(0.0, self.max_scroll());
        if clamped != self.scroll_y() {
            self.scroll_to(clamped);
        } else {
            self.update_intersections();
        }
    }

    // =========================================================================
    // Listeners and dispatch
    // =========================================================================

    /// Listen for `kind` on `el` (and events bubbling up from its descendants).
    pub fn add_listener(
        &self,
        el: ElementId,
        kind: EventKind,
        handler: impl Fn(&Page, &mut Event) + 'static,
    ) -> ListenerId {
        self.inner.listeners.borrow_mut().add(el, kind, Rc::new(handler))
    }

    /// Listen for window-level `kind` events (scroll).
    pub fn add_window_listener(
        &self,
        kind: EventKind,
        handler: impl Fn(&Page, &mut Event) + 'static,
    ) -> ListenerId {
        self.inner.listeners.borrow_mut().add_window(kind, Rc::new(handler))
    }

    /// Returns `false` if the listener was already removed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Deliver `event` and hand it back so callers can inspect
    /// `is_default_prevented`.
    ///
    /// Element events visit the target, then each ancestor; window handlers
    /// for the same kind run last.
    pub fn dispatch(&self, mut event: Event) -> Event {
        let path = match event.target {
            Some(target) => self.document().ancestors_inclusive(target),
            None => Vec::new(),
        };

        for el in path {
            let handlers = self.inner.listeners.borrow().element_handlers(el, event.kind);
            event.current_target = Some(el);
            for handler in handlers {
                handler(self, &mut event);
            }
        }

        let handlers = self.inner.listeners.borrow().window_handlers(event.kind);
        event.current_target = None;
        for handler in handlers {
            handler(self, &mut event);
        }
        event
    }

    /// Simulate a click. Returns `true` if the default action should proceed.
    pub fn click(&self, el: ElementId) -> bool {
        !self
            .dispatch(Event::new(EventKind::Click, Some(el)))
            .is_default_prevented()
    }

    /// Simulate a form submission. Returns `true` if the host would submit.
    pub fn submit(&self, form: ElementId) -> bool {
        let proceed = !self
            .dispatch(Event::new(EventKind::Submit, Some(form)))
            .is_default_prevented();
        if proceed {
            tracing::debug!(%form, "submission not intercepted");
        }
        proceed
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register a new intersection observer on this page.
    pub fn create_observer(
        &self,
        options: ObserverOptions,
        callback: impl Fn(&Page, &[IntersectionEntry], &IntersectionObserver) + 'static,
    ) -> IntersectionObserver {
        let observer = IntersectionObserver::new(self.downgrade(), options, Rc::new(callback));
        self.inner.observers.borrow_mut().push(observer.clone());
        observer
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    pub(crate) fn remove_observer(&self, observer: &IntersectionObserver) {
        self.inner
            .observers
            .borrow_mut()
            .retain(|o| !o.ptr_eq(observer));
    }

    /// Recompute every observer against the current viewport and deliver
    /// changed entries.
    pub fn update_intersections(&self) {
        let observers: Vec<IntersectionObserver> = self.inner.observers.borrow().clone();
        let viewport = self.viewport().rect();

        for observer in observers {
            let entries = self.measure(|doc| observer.collect_entries(doc, viewport));
            if !entries.is_empty() {
                observer.notify(self, &entries);
            }
        }
    }

    /// Ask for one intersection pass on the next frame; repeated calls before
    /// that frame share it.
    pub(crate) fn schedule_intersection_check(&self) {
        if self.inner.intersection_frame.get().is_some() {
            return;
        }
        let weak = self.downgrade();
        let id = self.inner.scheduler.request_animation_frame(Box::new(move |_| {
            if let Some(page) = weak.upgrade() {
                page.inner.intersection_frame.set(None);
                page.update_intersections();
            }
        }));
        self.inner.intersection_frame.set(Some(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassSet, RootMargin};

    fn setup() -> (Page, Rc<VirtualScheduler>) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(body, Element::new("nav").id("navbar").height(80.0));
        doc.append(nav, Element::new("a").id("link").attr("href", "#far"));
        doc.append(body, Element::new("section").id("near").height(700.0));
        doc.append(body, Element::new("section").id("far").height(1000.0));
        let sched = Rc::new(VirtualScheduler::new());
        let page = Page::new(doc, sched.clone(), Viewport::new(1024.0, 600.0));
        (page, sched)
    }

    #[test]
    fn test_scroll_to_clamps_and_notifies() {
        let (page, _) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        page.add_window_listener(EventKind::Scroll, move |page, _| {
            s.borrow_mut().push(page.scroll_y());
        });

        // content 1780, viewport 600
        assert_eq!(page.max_scroll(), 1180.0);
        page.scroll_to(300.0);
        page.scroll_to(300.0);
        page.scroll_to(5000.0);
        page.scroll_to(-20.0);

        assert_eq!(*seen.borrow(), vec![300.0, 1180.0, 0.0]);
        assert_eq!(page.scroll_signal().get(), 0.0);
    }

    #[test]
    fn test_click_bubbles_to_ancestors() {
        let (page, _) = setup();
        let link = page.get_element_by_id("link").unwrap();
        let nav = page.get_element_by_id("navbar").unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        page.add_listener(nav, EventKind::Click, move |_, event| {
            o.borrow_mut().push(("nav", event.target, event.current_target));
            event.prevent_default();
        });
        let o = order.clone();
        page.add_listener(link, EventKind::Click, move |_, event| {
            o.borrow_mut().push(("link", event.target, event.current_target));
        });

        assert!(!page.click(link));
        assert_eq!(
            *order.borrow(),
            vec![("link", Some(link), Some(link)), ("nav", Some(link), Some(nav))]
        );
    }

    #[test]
    fn test_handler_may_remove_itself() {
        let (page, _) = setup();
        let link = page.get_element_by_id("link").unwrap();
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let (h, s) = (hits.clone(), slot.clone());
        let id = page.add_listener(link, EventKind::Click, move |page, _| {
            h.set(h.get() + 1);
            if let Some(id) = s.take() {
                page.remove_listener(id);
            }
        });
        slot.set(Some(id));

        page.click(link);
        page.click(link);
        assert_eq!(hits.get(), 1);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn test_update_document_bumps_revision() {
        let (page, _) = setup();
        let nav = page.get_element_by_id("navbar").unwrap();
        let before = page.revision();
        page.update_document(|doc| doc.add_class(nav, ClassSet::SCROLLED));
        assert_eq!(page.revision(), before + 1);
        assert_eq!(page.revision_signal().get(), before + 1);
        assert!(page.document().has_class(nav, ClassSet::SCROLLED));
    }

    #[test]
    fn test_observer_initial_entries_on_next_frame() {
        let (page, sched) = setup();
        let near = page.get_element_by_id("near").unwrap();
        let far = page.get_element_by_id("far").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        let observer = page.create_observer(ObserverOptions::new(0.1), move |_, entries, _| {
            s.borrow_mut().extend(entries.iter().map(|e| (e.target, e.is_intersecting)));
        });
        observer.observe(near);
        observer.observe(far);
        observer.observe(far);
        assert!(seen.borrow().is_empty());
        assert_eq!(sched.pending_frames(), 1);

        sched.run_frame();
        assert_eq!(*seen.borrow(), vec![(near, true), (far, false)]);

        // No change, no entries.
        page.update_intersections();
        assert_eq!(seen.borrow().len(), 2);

        // far starts at 780: 0.1 * 1000 = 100px must be visible.
        page.scroll_to(279.0);
        assert_eq!(seen.borrow().len(), 2);
        page.scroll_to(281.0);
        assert_eq!(seen.borrow().last(), Some(&(far, true)));
    }

    #[test]
    fn test_observer_root_margin_delays_trigger() {
        let (page, sched) = setup();
        let far = page.get_element_by_id("far").unwrap();
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        let options = ObserverOptions::new(0.0).with_root_margin(RootMargin::bottom_inset(60.0));
        let observer = page.create_observer(options, move |_, entries, _| {
            h.set(h.get() + entries.iter().filter(|e| e.is_intersecting).count());
        });
        observer.observe(far);
        sched.run_frame();

        // Viewport bottom at 790 overlaps far (780), but the inset root ends at 730.
        page.scroll_to(190.0);
        assert_eq!(hits.get(), 0);
        page.scroll_to(250.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_disconnect_removes_observer() {
        let (page, sched) = setup();
        let near = page.get_element_by_id("near").unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let observer = page.create_observer(ObserverOptions::new(0.5), move |_, _, _| h.set(h.get() + 1));
        observer.observe(near);
        assert_eq!(page.observer_count(), 1);

        observer.disconnect();
        sched.run_frame();
        assert_eq!(hits.get(), 0);
        assert_eq!(page.observer_count(), 0);
        assert!(!observer.is_observing(near));
    }

    #[test]
    fn test_resize_reclamps_scroll() {
        let (page, _) = setup();
        page.scroll_to(1180.0);
        page.resize(1024.0, 1000.0);
        assert_eq!(page.scroll_y(), 780.0);
    }
}
