use js_sys::Reflect;
use transition_core::resolve_transition_end;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Bubbling, cancelable `CustomEvent` without detail.
pub fn custom_event(name: &str) -> Result<web::CustomEvent, JsValue> {
    let init = web::CustomEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    web::CustomEvent::new_with_event_init_dict(name, &init)
}

/// Run `task` from a zero-delay timeout so the browser gets to paint first.
pub fn set_timeout_0(task: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let callback = Closure::once_into_js(task);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
}

/// Look for a transition style property on a throwaway element and map it to
/// its completion event name.
pub fn probe_transition_end(document: &web::Document) -> Option<&'static str> {
    let scratch = document
        .create_element("fakeelement")
        .ok()?
        .dyn_into::<web::HtmlElement>()
        .ok()?;
    let style = scratch.style();
    resolve_transition_end(|property| {
        Reflect::get(&style, &JsValue::from_str(property))
            .map(|v| !v.is_undefined())
            .unwrap_or(false)
    })
    .ok()
}

/// Everything a `NodeList` holds, as event targets.
pub fn node_list_targets(list: &web::NodeList) -> Vec<web::EventTarget> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(web::EventTarget::from)
        .collect()
}
