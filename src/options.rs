use js_sys::{Function, Object, Reflect};
use transition_core::{TransitionEnd, TransitionOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

pub const ON_SHOW_TRANSITION_END: &str = "onShowTransitionEnd";
pub const ON_HIDE_TRANSITION_END: &str = "onHideTransitionEnd";

/// Build controller options from a plain JS object. Data keys go through
/// `JSON.stringify` + serde; callback keys are picked out separately since
/// JSON drops functions.
pub fn from_js(options: &JsValue, element: &web::HtmlElement) -> anyhow::Result<TransitionOptions> {
    let mut opts = if options.is_undefined() || options.is_null() {
        TransitionOptions::default()
    } else {
        let json = js_sys::JSON::stringify(options)
            .map_err(|e| anyhow::anyhow!("options are not serializable: {e:?}"))?;
        TransitionOptions::from_json(&String::from(json))?
    };

    if let Some(f) = function_prop(options, ON_SHOW_TRANSITION_END) {
        let this = element.clone();
        opts = opts.on_show_transition_end(move |ev| {
            if let Err(e) = f.call1(&this, &event_to_js(ev)) {
                log::error!("[options] {ON_SHOW_TRANSITION_END} threw: {e:?}");
            }
        });
    }
    if let Some(f) = function_prop(options, ON_HIDE_TRANSITION_END) {
        let this = element.clone();
        opts = opts.on_hide_transition_end(move |ev, classname| {
            if let Err(e) = f.call2(&this, &event_to_js(ev), &JsValue::from_str(classname)) {
                log::error!("[options] {ON_HIDE_TRANSITION_END} threw: {e:?}");
            }
        });
    }
    Ok(opts)
}

fn function_prop(obj: &JsValue, key: &str) -> Option<Function> {
    if !obj.is_object() {
        return None;
    }
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

/// Plain `{ propertyName, elapsedTime, pseudoElement }` object.
pub fn event_to_js(ev: &TransitionEnd) -> JsValue {
    let obj = Object::new();
    _ = Reflect::set(&obj, &"propertyName".into(), &ev.property_name.as_str().into());
    _ = Reflect::set(
        &obj,
        &"elapsedTime".into(),
        &JsValue::from_f64(f64::from(ev.elapsed_time)),
    );
    _ = Reflect::set(&obj, &"pseudoElement".into(), &ev.pseudo_element.as_str().into());
    obj.into()
}
