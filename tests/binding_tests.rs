// Host-side tests for on()/off() event wiring.

use std::cell::Cell;
use std::rc::Rc;
use transition_core::headless::{HeadlessDocument, HeadlessHost, HeadlessNode};
use transition_core::{Action, Target, TransitionController, TransitionOptions};

const SHOWN: &str = "menu_is_shown";
const HIDDEN: &str = "menu_is_hidden";

struct Page {
    doc: HeadlessDocument,
    menu: HeadlessNode,
    button: HeadlessNode,
    controller: TransitionController<HeadlessHost>,
}

fn page() -> Page {
    let doc = HeadlessDocument::new();
    let menu = doc.create_element("nav", &["menu", HIDDEN]);
    let button = doc.create_element("button", &["menu-trigger"]);
    button.set_id("open-menu");
    let controller =
        TransitionController::new(doc.host(&menu), TransitionOptions::new(SHOWN, HIDDEN)).unwrap();
    Page {
        doc,
        menu,
        button,
        controller,
    }
}

#[test]
fn reserved_action_names() {
    assert!(matches!(Action::<HeadlessHost>::named("show"), Some(Action::Show)));
    assert!(matches!(Action::<HeadlessHost>::named("hide"), Some(Action::Hide)));
    assert!(matches!(Action::<HeadlessHost>::named("toggle"), Some(Action::Toggle)));
    assert!(Action::<HeadlessHost>::named("Toggle").is_none());
    assert!(Action::<HeadlessHost>::named("").is_none());
}

#[test]
fn toggle_bound_by_selector_acts_like_calling_toggle() {
    let p = page();
    p.controller.on("click", "#open-menu", Action::Toggle);
    assert_eq!(p.button.listener_count("click"), 1);

    p.button.fire("click");
    p.doc.run_pending();
    assert!(!p.controller.is_hidden());
    assert!(p.menu.has_class(SHOWN));

    p.button.fire("click");
    assert!(p.controller.is_hidden());
    assert!(p.menu.has_class(HIDDEN));
}

#[test]
fn off_detaches_the_matching_binding() {
    let p = page();
    p.controller
        .on("click", "#open-menu", Action::Show)
        .on("mouseover", "#open-menu", Action::Show)
        .off("click", "#open-menu", Action::Show);

    assert_eq!(p.button.listener_count("click"), 0);
    assert_eq!(p.button.listener_count("mouseover"), 1);
    assert_eq!(p.controller.bound_listeners(), 1);

    p.button.fire("click");
    p.doc.run_pending();
    assert!(p.controller.is_hidden());

    p.button.fire("mouseover");
    p.doc.run_pending();
    assert!(!p.controller.is_hidden());
}

#[test]
fn off_with_a_different_action_keeps_the_binding() {
    let p = page();
    p.controller
        .on("click", Target::<HeadlessHost>::Node(p.button.clone()), Action::Show)
        .off("click", Target::<HeadlessHost>::Node(p.button.clone()), Action::Hide);
    assert_eq!(p.button.listener_count("click"), 1);
}

#[test]
fn selector_binds_every_match() {
    let p = page();
    let second = p.doc.create_element("a", &["menu-trigger"]);
    p.controller.on("click", ".menu-trigger", Action::Hide);

    assert_eq!(p.button.listener_count("click"), 1);
    assert_eq!(second.listener_count("click"), 1);
    assert_eq!(p.controller.bound_listeners(), 2);
}

#[test]
fn resolver_target_receives_the_controlled_element() {
    let p = page();
    let seen = Rc::new(Cell::new(false));
    let s = seen.clone();
    let menu = p.menu.clone();
    p.controller.on(
        "keydown",
        Target::<HeadlessHost>::resolve(move |el: &HeadlessNode| {
            s.set(*el == menu);
            vec![el.clone()]
        }),
        Action::Hide,
    );
    assert!(seen.get());
    assert_eq!(p.menu.listener_count("keydown"), 1);
}

#[test]
fn custom_actions_unbind_by_identity() {
    let p = page();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let count = Action::custom(move |c: &TransitionController<HeadlessHost>| {
        assert!(c.is_hidden());
        h.set(h.get() + 1);
    });
    let lookalike = Action::custom(|_: &TransitionController<HeadlessHost>| {});

    p.controller.on("click", "#open-menu", count.clone());
    p.button.fire("click");
    assert_eq!(hits.get(), 1);

    p.controller.off("click", "#open-menu", lookalike);
    assert_eq!(p.button.listener_count("click"), 1);

    p.controller.off("click", "#open-menu", count);
    p.button.fire("click");
    assert_eq!(hits.get(), 1);
    assert_eq!(p.controller.bound_listeners(), 0);
}

#[test]
fn unmatched_selector_binds_nothing() {
    let p = page();
    p.controller.on("click", "#nowhere", Action::Toggle);
    assert_eq!(p.controller.bound_listeners(), 0);
}

#[test]
fn dropping_the_controller_detaches_its_listeners() {
    let p = page();
    p.controller.on("click", "#open-menu", Action::Toggle);
    p.button.fire("click");
    p.doc.run_pending();
    p.controller.hide().unwrap();
    assert_eq!(p.button.listener_count("click"), 1);
    assert_eq!(p.menu.listener_count("transitionend"), 1);

    let Page {
        doc,
        menu,
        button,
        controller,
    } = p;
    drop(controller);

    assert_eq!(button.listener_count("click"), 0);
    assert_eq!(menu.listener_count("transitionend"), 0);
    assert_eq!(button.fire("click"), 0);
    assert_eq!(doc.pending_tasks(), 0);
    assert!(menu.has_class(HIDDEN));
}

#[test]
fn a_surviving_clone_keeps_the_listeners() {
    let p = page();
    let clone = p.controller.clone();
    p.controller.on("click", "#open-menu", Action::Show);
    drop(p.controller);

    assert_eq!(p.button.listener_count("click"), 1);
    assert_eq!(clone.bound_listeners(), 1);
}
