//! Errors raised synchronously by the controller at the call that detects them.

use thiserror::Error;

/// Which way the marker-class check failed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ambiguity {
    /// Element carries neither the show nor the hide marker class.
    Neither,
    /// Element carries both marker classes.
    Both,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// Required classnames missing or options unreadable.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{}", ambiguity_message(.kind, .show, .hide))]
    StateAmbiguity {
        kind: Ambiguity,
        show: String,
        hide: String,
    },

    /// No recognized transition style property on the host.
    #[error("transitionend event is not supported in this environment")]
    UnsupportedEnvironment,
}

impl TransitionError {
    pub(crate) fn missing_classnames() -> Self {
        Self::Configuration(
            "`hideTransitionClassname` and `showTransitionClassname` are not defined".to_string(),
        )
    }
}

fn ambiguity_message(kind: &Ambiguity, show: &str, hide: &str) -> String {
    match kind {
        Ambiguity::Neither => {
            format!("element must have one of the classes ['{hide}' or '{show}']")
        }
        Ambiguity::Both => {
            format!("element must have one class ['{hide}' or '{show}'], both given")
        }
    }
}

pub type Result<T> = std::result::Result<T, TransitionError>;
