//! The environment a controller drives: one element plus the surrounding
//! document's event plumbing.
//!
//! Implementations exist for the browser (in the wasm front-end) and for the
//! in-memory [`crate::headless`] document. Everything here is single-threaded;
//! handlers are `'static` closures the host calls back on its own turn.

use crate::error::Result;
use crate::event::TransitionEnd;
use std::rc::Rc;

pub trait Host: 'static {
    /// Anything listeners can be attached to (elements, the document, ...).
    type Node: Clone + PartialEq + 'static;
    /// Live registration of a one-shot completion handler.
    type Subscription: 'static;
    /// Live registration made by `on()`.
    type Listener: 'static;

    /// The controlled element as an event target.
    fn element(&self) -> Self::Node;

    // Class list of the controlled element. Add/remove are idempotent.
    fn add_class(&self, name: &str);
    fn remove_class(&self, name: &str);
    fn has_class(&self, name: &str) -> bool;

    // Inline style of the controlled element.
    fn set_style_property(&self, property: &str, value: &str);
    fn remove_style_property(&self, property: &str);

    /// Dispatch a bubbling, cancelable custom event on the controlled element.
    fn dispatch_custom_event(&self, name: &str);

    /// Run `task` on a later turn of the event loop, after the host has had
    /// a chance to paint.
    fn defer(&self, task: Box<dyn FnOnce()>);

    /// Name of the transition-completion event, or `UnsupportedEnvironment`.
    fn transition_end_event(&self) -> Result<&'static str>;

    /// Register `handler` for the next `event` on the controlled element.
    /// The host drops the registration before invoking the handler.
    fn subscribe_once(
        &self,
        event: &'static str,
        handler: Box<dyn FnOnce(TransitionEnd)>,
    ) -> Self::Subscription;

    fn unsubscribe(&self, event: &'static str, subscription: Self::Subscription);

    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;

    fn add_listener(&self, node: &Self::Node, event: &str, handler: Rc<dyn Fn()>)
        -> Self::Listener;

    fn remove_listener(&self, node: &Self::Node, event: &str, listener: Self::Listener);
}
