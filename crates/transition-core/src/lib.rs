//! Show, hide and toggle one element through CSS transitions.
//!
//! The controller adds a show or hide class to start a transition and only
//! touches `display`/`visibility` where the transition allows it: cleared
//! before showing, applied after hiding has finished. The environment is
//! abstracted behind [`Host`]; [`headless`] provides an in-memory one.

pub mod binding;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod headless;
pub mod host;
pub mod watcher;

pub use binding::{Action, Target};
pub use config::{HideEndCallback, Settings, ShowEndCallback, TransitionOptions, VisibilityMode};
pub use controller::{EndHandler, TransitionController};
pub use error::{Ambiguity, Result, TransitionError};
pub use event::{resolve_transition_end, TransitionEnd, INITIALIZED_EVENT, TRANSITION_END_EVENTS};
pub use host::Host;
pub use watcher::CompletionWatcher;
