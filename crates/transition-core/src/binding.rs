//! `on`/`off`: wire host events to controller actions.

use crate::controller::TransitionController;
use crate::host::Host;
use std::rc::Rc;

/// Where to attach a listener.
pub enum Target<H: Host> {
    /// Every node matching a CSS selector.
    Selector(String),
    Node(H::Node),
    /// Computed from the controlled element.
    Resolve(Rc<dyn Fn(&H::Node) -> Vec<H::Node>>),
}

impl<H: Host> Target<H> {
    pub fn resolve(f: impl Fn(&H::Node) -> Vec<H::Node> + 'static) -> Self {
        Self::Resolve(Rc::new(f))
    }

    fn nodes(&self, host: &H) -> Vec<H::Node> {
        match self {
            Self::Selector(selector) => host.query_selector_all(selector),
            Self::Node(node) => vec![node.clone()],
            Self::Resolve(f) => f(&host.element()),
        }
    }
}

impl<H: Host> From<&str> for Target<H> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

/// What to do when the bound event fires.
pub enum Action<H: Host> {
    Show,
    Hide,
    Toggle,
    Custom(Rc<dyn Fn(&TransitionController<H>)>),
}

impl<H: Host> Clone for Action<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Show => Self::Show,
            Self::Hide => Self::Hide,
            Self::Toggle => Self::Toggle,
            Self::Custom(f) => Self::Custom(f.clone()),
        }
    }
}

impl<H: Host> Action<H> {
    /// One of the reserved words `show`, `hide`, `toggle`.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "show" => Some(Self::Show),
            "hide" => Some(Self::Hide),
            "toggle" => Some(Self::Toggle),
            _ => None,
        }
    }

    pub fn custom(f: impl Fn(&TransitionController<H>) + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// Custom actions compare by the function they wrap.
    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Show, Self::Show) | (Self::Hide, Self::Hide) | (Self::Toggle, Self::Toggle) => {
                true
            }
            (Self::Custom(a), Self::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn perform(&self, controller: &TransitionController<H>) {
        let outcome = match self {
            Self::Show => controller.show().map(|_| ()),
            Self::Hide => controller.hide().map(|_| ()),
            Self::Toggle => controller.toggle().map(|_| ()),
            Self::Custom(f) => {
                f(controller);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            log::error!("[binding] action failed: {e}");
        }
    }
}

pub(crate) struct Binding<H: Host> {
    event: String,
    node: H::Node,
    action: Action<H>,
    listener: H::Listener,
}

impl<H: Host> Binding<H> {
    pub(crate) fn detach(self, host: &H) {
        host.remove_listener(&self.node, &self.event, self.listener);
    }
}

impl<H: Host> TransitionController<H> {
    /// Run `action` whenever `event` fires on each node `target` resolves to.
    pub fn on(&self, event: &str, target: impl Into<Target<H>>, action: Action<H>) -> &Self {
        let inner = &self.inner;
        for node in target.into().nodes(&inner.host) {
            let weak = Rc::downgrade(inner);
            let bound = action.clone();
            let handler: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    bound.perform(&TransitionController { inner });
                }
            });
            let listener = inner.host.add_listener(&node, event, handler);
            inner.bindings.borrow_mut().push(Binding {
                event: event.to_string(),
                node,
                action: action.clone(),
                listener,
            });
        }
        self
    }

    /// Detach listeners previously attached by [`on`](Self::on) with the same
    /// event, target and action.
    pub fn off(&self, event: &str, target: impl Into<Target<H>>, action: Action<H>) -> &Self {
        let inner = &self.inner;
        let nodes = target.into().nodes(&inner.host);
        let removed: Vec<Binding<H>> = {
            let mut bindings = inner.bindings.borrow_mut();
            let (removed, kept) = std::mem::take(&mut *bindings).into_iter().partition(|b| {
                b.event == event && b.action.same_as(&action) && nodes.contains(&b.node)
            });
            *bindings = kept;
            removed
        };
        for b in removed {
            b.detach(&inner.host);
        }
        self
    }

    /// Number of listeners currently attached through `on`.
    pub fn bound_listeners(&self) -> usize {
        self.inner.bindings.borrow().len()
    }
}
