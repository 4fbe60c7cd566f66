#![cfg(target_arch = "wasm32")]
use crate::host::WebHost;
use js_sys::Function;
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::{Rc, Weak};
use transition_core::{Action, EndHandler, Target, TransitionController, TransitionEnd};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod dom;
mod host;
mod options;

type Controller = TransitionController<WebHost>;
type ActionRegistry = Rc<RefCell<Vec<(Function, Action<WebHost>)>>>;

fn to_js(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("transition-web ready");
    Ok(())
}

/// JavaScript handle to a controller. Methods without a callback return a
/// handle to the same controller, so calls chain.
#[wasm_bindgen]
#[derive(Clone)]
pub struct ToggleTransition {
    controller: Controller,
    // JS functions passed to on(), so off() with the same function finds them.
    actions: ActionRegistry,
}

#[wasm_bindgen]
impl ToggleTransition {
    #[wasm_bindgen(constructor)]
    pub fn new(node: web::HtmlElement, options: JsValue) -> Result<ToggleTransition, JsValue> {
        let opts = options::from_js(&options, &node).map_err(to_js)?;
        let host = WebHost::new(node).map_err(to_js)?;
        let controller = TransitionController::new(host, opts).map_err(to_js)?;
        Ok(Self {
            controller,
            actions: Rc::default(),
        })
    }

    #[wasm_bindgen(getter, js_name = isHidden)]
    pub fn is_hidden(&self) -> bool {
        self.controller.is_hidden()
    }

    #[wasm_bindgen(getter)]
    pub fn element(&self) -> web::HtmlElement {
        self.controller.host().html_element().clone()
    }

    /// Add `classname`; `callback` runs right away, `on_transition_end` once
    /// the transition finishes.
    pub fn transition(
        &self,
        classname: String,
        callback: Option<Function>,
        on_transition_end: Option<Function>,
    ) -> Result<JsValue, JsValue> {
        let on_end = on_transition_end.map(|f| {
            let this = self.element();
            let handler: EndHandler<WebHost> = Box::new(move |_c: &Controller, ev: &TransitionEnd| {
                if let Err(e) = f.call1(&this, &options::event_to_js(ev)) {
                    log::error!("[transition] onTransitionEnd threw: {e:?}");
                }
            });
            handler
        });
        self.controller
            .transition(&classname, on_end)
            .map_err(to_js)?;
        self.finish(callback)
    }

    pub fn show(&self, callback: Option<Function>) -> Result<JsValue, JsValue> {
        self.controller.show().map_err(to_js)?;
        self.finish(callback)
    }

    pub fn hide(&self, callback: Option<Function>) -> Result<JsValue, JsValue> {
        self.controller.hide().map_err(to_js)?;
        self.finish(callback)
    }

    /// A falsy callback result falls back to the handle itself.
    pub fn toggle(&self, callback: Option<Function>) -> Result<JsValue, JsValue> {
        self.controller.toggle().map_err(to_js)?;
        let this = JsValue::from(self.clone());
        match callback {
            Some(f) => {
                let out = f.call0(&this)?;
                Ok(if out.is_truthy() { out } else { this })
            }
            None => Ok(this),
        }
    }

    /// `target`: selector string, element, or function of the controlled
    /// element. `action`: `"show"`, `"hide"`, `"toggle"` or a function.
    pub fn on(
        &self,
        event: String,
        target: JsValue,
        action: JsValue,
    ) -> Result<ToggleTransition, JsValue> {
        let target = self.target_from_js(target)?;
        let action = self.action_from_js(action)?;
        self.controller.on(&event, target, action);
        Ok(self.clone())
    }

    pub fn off(
        &self,
        event: String,
        target: JsValue,
        action: JsValue,
    ) -> Result<ToggleTransition, JsValue> {
        let target = self.target_from_js(target)?;
        let action = self.action_from_js(action)?;
        self.controller.off(&event, target, action);
        Ok(self.clone())
    }
}

impl ToggleTransition {
    fn finish(&self, callback: Option<Function>) -> Result<JsValue, JsValue> {
        let this = JsValue::from(self.clone());
        match callback {
            Some(f) => f.call0(&this),
            None => Ok(this),
        }
    }

    fn target_from_js(&self, target: JsValue) -> Result<Target<WebHost>, JsValue> {
        if let Some(selector) = target.as_string() {
            return Ok(Target::Selector(selector));
        }
        if let Some(f) = target.dyn_ref::<Function>() {
            let f = f.clone();
            let this = JsValue::from(self.clone());
            return Ok(Target::<WebHost>::resolve(move |element: &web::EventTarget| {
                match f.call1(&this, element) {
                    Ok(found) => resolved_targets(found),
                    Err(e) => {
                        log::error!("[binding] target function threw: {e:?}");
                        Vec::new()
                    }
                }
            }));
        }
        match target.dyn_into::<web::EventTarget>() {
            Ok(node) => Ok(Target::Node(node)),
            Err(other) => Err(to_js(format!("unsupported target: {other:?}"))),
        }
    }

    fn action_from_js(&self, action: JsValue) -> Result<Action<WebHost>, JsValue> {
        if let Some(name) = action.as_string() {
            return Action::named(&name)
                .ok_or_else(|| to_js(format!("unknown action {name:?}")));
        }
        let f = action
            .dyn_into::<Function>()
            .map_err(|other| to_js(format!("unsupported action: {other:?}")))?;

        let mut registry = self.actions.borrow_mut();
        if let Some((_, known)) = registry.iter().find(|(g, _)| *g == f) {
            return Ok(known.clone());
        }
        let actions: Weak<RefCell<_>> = Rc::downgrade(&self.actions);
        let call = f.clone();
        let bound = Action::custom(move |controller: &Controller| {
            let this = ToggleTransition {
                controller: controller.clone(),
                actions: actions.upgrade().unwrap_or_default(),
            };
            if let Err(e) = call.call0(&JsValue::from(this)) {
                log::error!("[binding] action threw: {e:?}");
            }
        });
        registry.push((f, bound.clone()));
        Ok(bound)
    }
}

fn resolved_targets(found: JsValue) -> Vec<web::EventTarget> {
    if let Some(list) = found.dyn_ref::<web::NodeList>() {
        return dom::node_list_targets(list);
    }
    found
        .dyn_into::<web::EventTarget>()
        .map(|t| vec![t])
        .unwrap_or_default()
}
