//! Completion-signal names and payloads.

use crate::error::{Result, TransitionError};

/// Custom event dispatched on the element once a controller is set up.
pub const INITIALIZED_EVENT: &str = "controller-initialized";

/// Style property probed on a scratch element, paired with the completion
/// event it implies. Checked in order; the first supported one wins.
pub const TRANSITION_END_EVENTS: [(&str, &str); 4] = [
    ("transition", "transitionend"),
    ("OTransition", "oTransitionEnd"),
    ("MozTransition", "transitionend"),
    ("WebkitTransition", "webkitTransitionEnd"),
];

/// Pick the completion event name for a host whose style object supports
/// the properties accepted by `supports`.
pub fn resolve_transition_end(supports: impl Fn(&str) -> bool) -> Result<&'static str> {
    TRANSITION_END_EVENTS
        .iter()
        .find(|(property, _)| supports(property))
        .map(|(_, event)| *event)
        .ok_or(TransitionError::UnsupportedEnvironment)
}

/// What the host reports when a CSS transition finishes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionEnd {
    pub property_name: String,
    /// Seconds the transition ran, excluding delay.
    pub elapsed_time: f32,
    pub pseudo_element: String,
}

impl TransitionEnd {
    pub fn new(property_name: impl Into<String>, elapsed_time: f32) -> Self {
        Self {
            property_name: property_name.into(),
            elapsed_time,
            pseudo_element: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_property_wins_over_prefixed_ones() {
        let name = resolve_transition_end(|_| true).unwrap();
        assert_eq!(name, "transitionend");
    }

    #[test]
    fn falls_back_to_vendor_prefixes_in_order() {
        assert_eq!(
            resolve_transition_end(|p| p == "OTransition" || p == "WebkitTransition").unwrap(),
            "oTransitionEnd"
        );
        assert_eq!(
            resolve_transition_end(|p| p == "WebkitTransition").unwrap(),
            "webkitTransitionEnd"
        );
        assert_eq!(
            resolve_transition_end(|p| p == "MozTransition").unwrap(),
            "transitionend"
        );
    }

    #[test]
    fn no_supported_property_is_an_unsupported_environment() {
        assert_eq!(
            resolve_transition_end(|_| false),
            Err(TransitionError::UnsupportedEnvironment)
        );
    }
}
