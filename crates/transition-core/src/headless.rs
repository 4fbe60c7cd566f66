//! In-memory document implementing [`Host`].
//!
//! Nothing runs on its own here: deferred tasks sit in a FIFO until
//! [`HeadlessDocument::run_pending`] drains it, and transition completion only
//! happens when a test (or a server-side renderer) calls
//! [`HeadlessNode::fire`]. That makes every interleaving of requests and
//! completions reproducible.

use crate::error::Result;
use crate::event::{resolve_transition_end, TransitionEnd};
use crate::host::Host;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

enum Callback {
    Once(Box<dyn FnOnce(TransitionEnd)>),
    Repeat(Rc<dyn Fn()>),
}

struct Registration {
    key: u64,
    event: String,
    callback: Callback,
}

struct NodeData {
    tag: String,
    id: RefCell<Option<String>>,
    classes: RefCell<Vec<String>>,
    style: RefCell<BTreeMap<String, String>>,
    listeners: RefCell<Vec<Registration>>,
    dispatched: RefCell<Vec<String>>,
}

/// Shared handle to one node. Equality is identity.
#[derive(Clone)]
pub struct HeadlessNode {
    data: Rc<NodeData>,
}

impl PartialEq for HeadlessNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for HeadlessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessNode")
            .field("tag", &self.data.tag)
            .field("id", &self.data.id.borrow())
            .field("classes", &self.data.classes.borrow())
            .field("style", &self.data.style.borrow())
            .finish()
    }
}

impl HeadlessNode {
    fn new(tag: &str, classes: &[&str]) -> Self {
        Self {
            data: Rc::new(NodeData {
                tag: tag.to_string(),
                id: RefCell::new(None),
                classes: RefCell::new(classes.iter().map(|c| c.to_string()).collect()),
                style: RefCell::new(BTreeMap::new()),
                listeners: RefCell::new(Vec::new()),
                dispatched: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn tag(&self) -> &str {
        &self.data.tag
    }

    pub fn id(&self) -> Option<String> {
        self.data.id.borrow().clone()
    }

    pub fn set_id(&self, id: &str) -> &Self {
        *self.data.id.borrow_mut() = Some(id.to_string());
        self
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.data.classes.borrow().iter().any(|c| c == name)
    }

    pub fn classes(&self) -> Vec<String> {
        self.data.classes.borrow().clone()
    }

    pub fn add_class(&self, name: &str) {
        let mut classes = self.data.classes.borrow_mut();
        if !classes.iter().any(|c| c == name) {
            classes.push(name.to_string());
        }
    }

    pub fn remove_class(&self, name: &str) {
        self.data.classes.borrow_mut().retain(|c| c != name);
    }

    /// Inline style value, if set.
    pub fn style(&self, property: &str) -> Option<String> {
        self.data.style.borrow().get(property).cloned()
    }

    pub fn set_style(&self, property: &str, value: &str) {
        self.data
            .style
            .borrow_mut()
            .insert(property.to_string(), value.to_string());
    }

    pub fn remove_style(&self, property: &str) {
        self.data.style.borrow_mut().remove(property);
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.data
            .listeners
            .borrow()
            .iter()
            .filter(|r| r.event == event)
            .count()
    }

    /// Custom events dispatched on (or bubbled to) this node, oldest first.
    pub fn dispatched(&self) -> Vec<String> {
        self.data.dispatched.borrow().clone()
    }

    pub fn fire(&self, event: &str) -> usize {
        self.fire_with(event, TransitionEnd::default())
    }

    /// Invoke every listener for `event` in registration order. One-shot
    /// registrations are removed before any handler runs. Returns how many
    /// handlers were called.
    pub fn fire_with(&self, event: &str, payload: TransitionEnd) -> usize {
        let mut due = Vec::new();
        {
            let mut listeners = self.data.listeners.borrow_mut();
            let mut kept = Vec::with_capacity(listeners.len());
            for reg in listeners.drain(..) {
                if reg.event != event {
                    kept.push(reg);
                    continue;
                }
                if let Callback::Repeat(f) = &reg.callback {
                    due.push(Callback::Repeat(f.clone()));
                    kept.push(reg);
                } else if let Callback::Once(f) = reg.callback {
                    due.push(Callback::Once(f));
                }
            }
            *listeners = kept;
        }
        let fired = due.len();
        for callback in due {
            match callback {
                Callback::Once(f) => f(payload.clone()),
                Callback::Repeat(f) => f(),
            }
        }
        fired
    }

    fn register(&self, key: u64, event: &str, callback: Callback) {
        self.data.listeners.borrow_mut().push(Registration {
            key,
            event: event.to_string(),
            callback,
        });
    }

    fn unregister(&self, key: u64) {
        self.data.listeners.borrow_mut().retain(|r| r.key != key);
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.data.id.borrow().as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.has_class(class)
        } else {
            self.data.tag.eq_ignore_ascii_case(selector)
        }
    }
}

struct DocumentState {
    root: HeadlessNode,
    nodes: RefCell<Vec<HeadlessNode>>,
    tasks: RefCell<VecDeque<Box<dyn FnOnce()>>>,
    transition_properties: Vec<String>,
    next_key: Cell<u64>,
}

#[derive(Clone)]
pub struct HeadlessDocument {
    state: Rc<DocumentState>,
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDocument {
    /// A document whose style objects support the standard `transition`.
    pub fn new() -> Self {
        Self::with_transition_properties(&["transition"])
    }

    /// A document whose style objects support exactly `properties`.
    pub fn with_transition_properties(properties: &[&str]) -> Self {
        Self {
            state: Rc::new(DocumentState {
                root: HeadlessNode::new("#document", &[]),
                nodes: RefCell::new(Vec::new()),
                tasks: RefCell::new(VecDeque::new()),
                transition_properties: properties.iter().map(|p| p.to_string()).collect(),
                next_key: Cell::new(1),
            }),
        }
    }

    /// The document itself as an event target.
    pub fn root(&self) -> HeadlessNode {
        self.state.root.clone()
    }

    pub fn create_element(&self, tag: &str, classes: &[&str]) -> HeadlessNode {
        let node = HeadlessNode::new(tag, classes);
        self.state.nodes.borrow_mut().push(node.clone());
        node
    }

    pub fn host(&self, element: &HeadlessNode) -> HeadlessHost {
        HeadlessHost {
            document: self.clone(),
            element: element.clone(),
        }
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<HeadlessNode> {
        let selector = selector.trim();
        self.state
            .nodes
            .borrow()
            .iter()
            .filter(|n| n.matches(selector))
            .cloned()
            .collect()
    }

    pub fn pending_tasks(&self) -> usize {
        self.state.tasks.borrow().len()
    }

    /// Drain the task queue, including tasks queued while draining.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.state.tasks.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    fn next_key(&self) -> u64 {
        let key = self.state.next_key.get();
        self.state.next_key.set(key + 1);
        key
    }
}

/// A [`HeadlessDocument`] bound to the element a controller manages.
#[derive(Clone)]
pub struct HeadlessHost {
    document: HeadlessDocument,
    element: HeadlessNode,
}

impl HeadlessHost {
    pub fn document(&self) -> &HeadlessDocument {
        &self.document
    }

    pub fn node(&self) -> &HeadlessNode {
        &self.element
    }

    /// Fire the completion event this document resolves to. Returns 0 when the
    /// document supports no transition property.
    pub fn fire_transition_end(&self) -> usize {
        match self.transition_end_event() {
            Ok(event) => self.element.fire(event),
            Err(_) => 0,
        }
    }
}

impl Host for HeadlessHost {
    type Node = HeadlessNode;
    type Subscription = u64;
    type Listener = u64;

    fn element(&self) -> HeadlessNode {
        self.element.clone()
    }

    fn add_class(&self, name: &str) {
        self.element.add_class(name);
    }

    fn remove_class(&self, name: &str) {
        self.element.remove_class(name);
    }

    fn has_class(&self, name: &str) -> bool {
        self.element.has_class(name)
    }

    fn set_style_property(&self, property: &str, value: &str) {
        self.element.set_style(property, value);
    }

    fn remove_style_property(&self, property: &str) {
        self.element.remove_style(property);
    }

    fn dispatch_custom_event(&self, name: &str) {
        // Bubbles straight from the element to the document.
        for node in [&self.element, &self.document.state.root] {
            node.data.dispatched.borrow_mut().push(name.to_string());
            node.fire(name);
        }
    }

    fn defer(&self, task: Box<dyn FnOnce()>) {
        self.document.state.tasks.borrow_mut().push_back(task);
    }

    fn transition_end_event(&self) -> Result<&'static str> {
        let supported = &self.document.state.transition_properties;
        resolve_transition_end(|p| supported.iter().any(|s| s == p))
    }

    fn subscribe_once(
        &self,
        event: &'static str,
        handler: Box<dyn FnOnce(TransitionEnd)>,
    ) -> u64 {
        let key = self.document.next_key();
        self.element.register(key, event, Callback::Once(handler));
        key
    }

    fn unsubscribe(&self, _event: &'static str, subscription: u64) {
        self.element.unregister(subscription);
    }

    fn query_selector_all(&self, selector: &str) -> Vec<HeadlessNode> {
        self.document.query_selector_all(selector)
    }

    fn add_listener(&self, node: &HeadlessNode, event: &str, handler: Rc<dyn Fn()>) -> u64 {
        let key = self.document.next_key();
        node.register(key, event, Callback::Repeat(handler));
        key
    }

    fn remove_listener(&self, node: &HeadlessNode, _event: &str, listener: u64) {
        node.unregister(listener);
    }
}
