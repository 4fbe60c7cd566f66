//! The show/hide state machine for a single element.
//!
//! Logical state is one boolean, `is_hidden`, flipped when a transition is
//! *requested* (the `on_applied` step). The physical visibility style trails
//! it: cleared before a show transition starts, re-applied only after a hide
//! transition reports completion.
//!
//! ```text
//!   Hidden --show()--> [style cleared, step deferred] --task--> Shown (transition running)
//!   Shown  --hide()--> Hidden (transition running) --transition end--> style applied
//! ```
//!
//! Every `show`/`hide` bumps an epoch; a deferred show step from an older
//! epoch is dropped, and the completion watcher is re-armed per transition,
//! so only the most recent request ever finishes. A hide that overtakes a
//! show from hidden before its step ran finishes on the spot.

use crate::binding::Binding;
use crate::config::{Settings, TransitionOptions};
use crate::error::{Ambiguity, Result, TransitionError};
use crate::event::{TransitionEnd, INITIALIZED_EVENT};
use crate::host::Host;
use crate::watcher::CompletionWatcher;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Runs when the transition it was armed for finishes.
pub type EndHandler<H> = Box<dyn FnOnce(&TransitionController<H>, &TransitionEnd)>;

pub(crate) struct Inner<H: Host> {
    pub(crate) host: H,
    pub(crate) settings: Settings,
    is_hidden: Cell<bool>,
    watcher: RefCell<CompletionWatcher<H>>,
    epoch: Cell<u64>,
    show_deferred: Cell<bool>,
    pub(crate) bindings: RefCell<Vec<Binding<H>>>,
}

/// Handle to a controller. Clones share the same state.
pub struct TransitionController<H: Host> {
    pub(crate) inner: Rc<Inner<H>>,
}

impl<H: Host> Clone for TransitionController<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: Host> TransitionController<H> {
    /// Validate `options`, read the initial state off the element's marker
    /// classes (unless `is_hidden` overrides it), sync the visibility style
    /// without any transition and announce [`INITIALIZED_EVENT`].
    pub fn new(host: H, options: TransitionOptions) -> Result<Self> {
        let settings = options.validate()?;
        let is_hidden = match settings.initially_hidden {
            Some(hidden) => hidden,
            None => detect_hidden(&host, &settings)?,
        };
        let controller = Self {
            inner: Rc::new(Inner {
                host,
                settings,
                is_hidden: Cell::new(is_hidden),
                watcher: RefCell::new(CompletionWatcher::new()),
                epoch: Cell::new(0),
                show_deferred: Cell::new(false),
                bindings: RefCell::new(Vec::new()),
            }),
        };
        controller.sync_visibility(is_hidden);
        controller.inner.host.dispatch_custom_event(INITIALIZED_EVENT);
        log::debug!(
            "[transition] initialized hidden={} via {}",
            is_hidden,
            controller.inner.settings.manage_visibility_with.property()
        );
        Ok(controller)
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden.get()
    }

    /// Whether a completion handler is currently armed.
    pub fn is_watching(&self) -> bool {
        self.inner.watcher.borrow().is_armed()
    }

    /// Whether a `show` is waiting for its deferred step.
    pub fn is_show_pending(&self) -> bool {
        self.inner.show_deferred.get()
    }

    /// Add `classname` and, when `on_end` is given, arm it for the next
    /// completion signal. Any previously armed handler is detached first.
    pub fn transition(&self, classname: &str, on_end: Option<EndHandler<H>>) -> Result<&Self> {
        self.transition_then(classname, on_end, |_| ())?;
        Ok(self)
    }

    /// Like [`transition`](Self::transition), then runs `on_applied`
    /// synchronously and returns its value. `on_applied` marks the request,
    /// not the end of the transition.
    pub fn transition_then<R>(
        &self,
        classname: &str,
        on_end: Option<EndHandler<H>>,
        on_applied: impl FnOnce(&Self) -> R,
    ) -> Result<R> {
        let inner = &self.inner;
        inner.watcher.borrow_mut().disarm(&inner.host);
        inner.host.add_class(classname);
        if let Some(on_end) = on_end {
            let weak = Rc::downgrade(inner);
            inner
                .watcher
                .borrow_mut()
                .arm(&inner.host, move |ticket, ev| {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    let live = inner.watcher.borrow_mut().settle(ticket);
                    if !live {
                        log::trace!("[transition] stale completion #{ticket} ignored");
                        return;
                    }
                    on_end(&TransitionController { inner }, &ev);
                })?;
        }
        Ok(on_applied(self))
    }

    pub fn show(&self) -> Result<&Self> {
        self.request_show()?;
        Ok(self)
    }

    /// `show`, then run `callback` right away (not on completion).
    pub fn show_then<R>(&self, callback: impl FnOnce(&Self) -> R) -> Result<R> {
        self.request_show()?;
        Ok(callback(self))
    }

    pub fn hide(&self) -> Result<&Self> {
        self.request_hide()?;
        Ok(self)
    }

    /// `hide`, then run `callback` right away (not on completion).
    pub fn hide_then<R>(&self, callback: impl FnOnce(&Self) -> R) -> Result<R> {
        self.request_hide()?;
        Ok(callback(self))
    }

    pub fn toggle(&self) -> Result<&Self> {
        self.request_toggle()?;
        Ok(self)
    }

    pub fn toggle_then<R>(&self, callback: impl FnOnce(&Self) -> R) -> Result<R> {
        self.request_toggle()?;
        Ok(callback(self))
    }

    fn request_toggle(&self) -> Result<()> {
        // A show still waiting on its deferred step already counts as shown.
        let heading_hidden = self.inner.is_hidden.get() && !self.inner.show_deferred.get();
        if heading_hidden {
            self.request_show()
        } else {
            self.request_hide()
        }
    }

    fn request_show(&self) -> Result<()> {
        let inner = &self.inner;
        inner.settings.ensure_ready()?;
        inner.host.transition_end_event()?;
        let epoch = self.next_epoch();
        // A hide still in flight must not re-apply the hidden style later.
        inner.watcher.borrow_mut().disarm(&inner.host);

        inner.host.remove_class(&inner.settings.hide_classname);
        // The element must be paintable before the show class lands,
        // otherwise there is nothing to transition from.
        self.sync_visibility(false);
        inner.show_deferred.set(true);

        let weak = Rc::downgrade(inner);
        inner.host.defer(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.epoch.get() != epoch {
                log::trace!("[transition] show step from epoch {epoch} superseded");
                return;
            }
            inner.show_deferred.set(false);
            let controller = TransitionController { inner };
            let classname = controller.inner.settings.show_classname.clone();
            let on_end: EndHandler<H> =
                Box::new(|c: &TransitionController<H>, ev: &TransitionEnd| {
                    log::debug!("[transition] show finished ({})", ev.property_name);
                    if let Some(callback) = &c.inner.settings.on_show_end {
                        callback(ev);
                    }
                });
            let applied =
                controller.transition_then(&classname, Some(on_end), |c| c.inner.is_hidden.set(false));
            if let Err(e) = applied {
                log::error!("[transition] show failed: {e}");
            }
        }));
        log::debug!("[transition] show requested (epoch {epoch})");
        Ok(())
    }

    fn request_hide(&self) -> Result<()> {
        let inner = &self.inner;
        inner.settings.ensure_ready()?;
        inner.host.transition_end_event()?;
        let epoch = self.next_epoch();
        // A show that started from hidden and never got its step has nothing
        // on screen to transition out of.
        let nothing_shown = inner.show_deferred.replace(false) && inner.is_hidden.get();

        inner.host.remove_class(&inner.settings.show_classname);
        let classname = inner.settings.hide_classname.clone();
        if nothing_shown {
            self.transition_then(&classname, None, |c| c.inner.is_hidden.set(true))?;
            self.finish_hide(&TransitionEnd::default());
            log::debug!("[transition] hide applied at once (epoch {epoch})");
            return Ok(());
        }
        let on_end: EndHandler<H> = Box::new(|c: &TransitionController<H>, ev: &TransitionEnd| {
            c.finish_hide(ev)
        });
        self.transition_then(&classname, Some(on_end), |c| c.inner.is_hidden.set(true))?;
        log::debug!("[transition] hide requested (epoch {epoch})");
        Ok(())
    }

    fn finish_hide(&self, ev: &TransitionEnd) {
        // Only now that the transition has played out may the element leave the layout.
        self.sync_visibility(true);
        log::debug!("[transition] hide finished ({})", ev.property_name);
        let settings = &self.inner.settings;
        if let Some(callback) = &settings.on_hide_end {
            callback(ev, &settings.hide_classname);
        }
    }

    fn next_epoch(&self) -> u64 {
        let epoch = self.inner.epoch.get() + 1;
        self.inner.epoch.set(epoch);
        epoch
    }

    /// Apply or clear the forced-hidden inline style, no transition involved.
    fn sync_visibility(&self, hidden: bool) {
        let mode = self.inner.settings.manage_visibility_with;
        if hidden {
            self.inner
                .host
                .set_style_property(mode.property(), mode.hidden_value());
        } else {
            self.inner.host.remove_style_property(mode.property());
        }
    }
}

impl<H: Host> Drop for Inner<H> {
    fn drop(&mut self) {
        // Host registrations outlive the controller unless taken down here.
        self.watcher.get_mut().disarm(&self.host);
        for binding in self.bindings.get_mut().drain(..) {
            binding.detach(&self.host);
        }
    }
}

fn detect_hidden<H: Host>(host: &H, settings: &Settings) -> Result<bool> {
    settings.ensure_ready()?;
    let hidden = host.has_class(&settings.hide_classname);
    let shown = host.has_class(&settings.show_classname);
    let kind = match (hidden, shown) {
        (true, false) => return Ok(true),
        (false, true) => return Ok(false),
        (false, false) => Ambiguity::Neither,
        (true, true) => Ambiguity::Both,
    };
    Err(TransitionError::StateAmbiguity {
        kind,
        show: settings.show_classname.clone(),
        hide: settings.hide_classname.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisibilityMode;
    use crate::headless::{HeadlessDocument, HeadlessHost};

    const SHOWN: &str = "popover_is_shown";
    const HIDDEN: &str = "popover_is_hidden";

    fn controller(classes: &[&str]) -> (HeadlessDocument, TransitionController<HeadlessHost>) {
        let doc = HeadlessDocument::new();
        let el = doc.create_element("div", classes);
        let c = TransitionController::new(doc.host(&el), TransitionOptions::new(SHOWN, HIDDEN))
            .unwrap();
        (doc, c)
    }

    #[test]
    fn initial_state_follows_marker_class() {
        let (_doc, c) = controller(&["popover", HIDDEN]);
        assert!(c.is_hidden());
        assert_eq!(c.host().node().style("display").as_deref(), Some("none"));

        let (_doc, c) = controller(&["popover", SHOWN]);
        assert!(!c.is_hidden());
        assert_eq!(c.host().node().style("display"), None);
    }

    #[test]
    fn is_hidden_option_skips_detection() {
        let doc = HeadlessDocument::new();
        let el = doc.create_element("div", &[]);
        let c = TransitionController::new(
            doc.host(&el),
            TransitionOptions::new(SHOWN, HIDDEN)
                .initially_hidden(true)
                .manage_visibility_with(VisibilityMode::Visibility),
        )
        .unwrap();
        assert!(c.is_hidden());
        assert_eq!(el.style("visibility").as_deref(), Some("hidden"));
    }

    #[test]
    fn transition_without_end_handler_leaves_nothing_armed() {
        let (_doc, c) = controller(&[SHOWN]);
        let applied = c.transition_then("flash", None, |_| 7).unwrap();
        assert_eq!(applied, 7);
        assert!(c.host().node().has_class("flash"));
        assert!(!c.is_watching());
    }

    #[test]
    fn transition_end_handler_fires_once() {
        let (_doc, c) = controller(&[SHOWN]);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let on_end: EndHandler<HeadlessHost> = Box::new(move |_, _| h.set(h.get() + 1));
        c.transition("flash", Some(on_end)).unwrap();
        assert!(c.is_watching());

        c.host().fire_transition_end();
        c.host().fire_transition_end();
        assert_eq!(hits.get(), 1);
        assert!(!c.is_watching());
    }

    #[test]
    fn show_defers_the_transition_step() {
        let (doc, c) = controller(&[HIDDEN]);
        c.show().unwrap();

        let el = c.host().node();
        assert!(!el.has_class(HIDDEN));
        assert!(!el.has_class(SHOWN));
        assert_eq!(el.style("display"), None);
        assert!(c.is_hidden());
        assert!(c.is_show_pending());

        doc.run_pending();
        assert!(el.has_class(SHOWN));
        assert!(!c.is_hidden());
        assert!(c.is_watching());
    }

    #[test]
    fn hide_superseding_a_pending_show_drops_its_step() {
        let (doc, c) = controller(&[HIDDEN]);
        c.show().unwrap().hide().unwrap();
        doc.run_pending();

        let el = c.host().node();
        assert!(el.has_class(HIDDEN));
        assert!(!el.has_class(SHOWN));
        assert!(c.is_hidden());
        assert_eq!(el.style("display").as_deref(), Some("none"));
        assert!(!c.is_watching());
    }

    #[test]
    fn hide_after_a_pending_show_from_shown_still_transitions() {
        let (doc, c) = controller(&[SHOWN]);
        c.show().unwrap().hide().unwrap();
        doc.run_pending();

        let el = c.host().node();
        assert!(el.has_class(HIDDEN));
        assert_eq!(el.style("display"), None);
        assert!(c.is_watching());

        c.host().fire_transition_end();
        assert_eq!(el.style("display").as_deref(), Some("none"));
    }

    #[test]
    fn dropping_the_last_handle_disarms_the_watcher() {
        let (_doc, c) = controller(&[SHOWN]);
        let el = c.host().node().clone();
        c.hide().unwrap();
        assert_eq!(el.listener_count("transitionend"), 1);

        drop(c);
        assert_eq!(el.listener_count("transitionend"), 0);
    }
}
