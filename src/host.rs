use crate::dom;
use std::rc::Rc;
use std::sync::OnceLock;
use transition_core::{Host, TransitionEnd, TransitionError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

// Resolved on first use and shared by every controller on the page.
static TRANSITION_END: OnceLock<Option<&'static str>> = OnceLock::new();

pub type EventClosure = Closure<dyn FnMut(web::Event)>;

/// [`Host`] over a live DOM element.
pub struct WebHost {
    document: web::Document,
    element: web::HtmlElement,
}

impl WebHost {
    pub fn new(element: web::HtmlElement) -> anyhow::Result<Self> {
        let document = element
            .owner_document()
            .or_else(dom::window_document)
            .ok_or_else(|| anyhow::anyhow!("element has no owner document"))?;
        Ok(Self { document, element })
    }

    pub fn html_element(&self) -> &web::HtmlElement {
        &self.element
    }
}

fn transition_end_from(ev: &web::Event) -> TransitionEnd {
    ev.dyn_ref::<web::TransitionEvent>()
        .map(|t| TransitionEnd {
            property_name: t.property_name(),
            elapsed_time: t.elapsed_time(),
            pseudo_element: t.pseudo_element(),
        })
        .unwrap_or_default()
}

impl Host for WebHost {
    type Node = web::EventTarget;
    type Subscription = EventClosure;
    type Listener = EventClosure;

    fn element(&self) -> web::EventTarget {
        self.element.clone().into()
    }

    fn add_class(&self, name: &str) {
        if let Err(e) = self.element.class_list().add_1(name) {
            log::warn!("[host] add class {name}: {e:?}");
        }
    }

    fn remove_class(&self, name: &str) {
        if let Err(e) = self.element.class_list().remove_1(name) {
            log::warn!("[host] remove class {name}: {e:?}");
        }
    }

    fn has_class(&self, name: &str) -> bool {
        self.element.class_list().contains(name)
    }

    fn set_style_property(&self, property: &str, value: &str) {
        _ = self.element.style().set_property(property, value);
    }

    fn remove_style_property(&self, property: &str) {
        _ = self.element.style().remove_property(property);
    }

    fn dispatch_custom_event(&self, name: &str) {
        match dom::custom_event(name) {
            Ok(ev) => {
                _ = self.element.dispatch_event(&ev);
            }
            Err(e) => log::warn!("[host] cannot create {name}: {e:?}"),
        }
    }

    fn defer(&self, task: Box<dyn FnOnce()>) {
        if let Err(e) = dom::set_timeout_0(task) {
            log::error!("[host] setTimeout failed: {e:?}");
        }
    }

    fn transition_end_event(&self) -> transition_core::Result<&'static str> {
        TRANSITION_END
            .get_or_init(|| dom::probe_transition_end(&self.document))
            .ok_or(TransitionError::UnsupportedEnvironment)
    }

    fn subscribe_once(
        &self,
        event: &'static str,
        handler: Box<dyn FnOnce(TransitionEnd)>,
    ) -> EventClosure {
        let mut handler = Some(handler);
        let closure = Closure::wrap(Box::new(move |ev: web::Event| {
            if let Some(h) = handler.take() {
                h(transition_end_from(&ev));
            }
        }) as Box<dyn FnMut(web::Event)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_once(true);
        if let Err(e) = self
            .element
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                closure.as_ref().unchecked_ref(),
                &opts,
            )
        {
            log::warn!("[host] cannot listen for {event}: {e:?}");
        }
        closure
    }

    fn unsubscribe(&self, event: &'static str, subscription: EventClosure) {
        _ = self
            .element
            .remove_event_listener_with_callback(event, subscription.as_ref().unchecked_ref());
    }

    fn query_selector_all(&self, selector: &str) -> Vec<web::EventTarget> {
        match self.document.query_selector_all(selector) {
            Ok(list) => dom::node_list_targets(&list),
            Err(e) => {
                log::warn!("[host] bad selector {selector:?}: {e:?}");
                Vec::new()
            }
        }
    }

    fn add_listener(
        &self,
        node: &web::EventTarget,
        event: &str,
        handler: Rc<dyn Fn()>,
    ) -> EventClosure {
        let closure =
            Closure::wrap(Box::new(move |_ev: web::Event| handler()) as Box<dyn FnMut(web::Event)>);
        _ = node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure
    }

    fn remove_listener(&self, node: &web::EventTarget, event: &str, listener: EventClosure) {
        _ = node.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
    }
}
