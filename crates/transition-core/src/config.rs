//! Controller options and the validated settings snapshot built from them.
//!
//! `TransitionOptions` is the loose, user-facing bag (every field optional,
//! deserializable from the camelCase keys a JavaScript caller would pass).
//! `Settings` is what the controller actually holds: required classnames
//! present, visibility mode resolved, immutable after construction.

use crate::error::{Result, TransitionError};
use crate::event::TransitionEnd;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::rc::Rc;

/// Invoked once the show transition has finished.
pub type ShowEndCallback = Rc<dyn Fn(&TransitionEnd)>;
/// Invoked once the hide transition has finished, with the hide classname.
pub type HideEndCallback = Rc<dyn Fn(&TransitionEnd, &str)>;

/// CSS property used to take the element out of view once hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// `display: none`
    #[default]
    Display,
    /// `visibility: hidden`
    Visibility,
}

impl VisibilityMode {
    pub fn property(self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Visibility => "visibility",
        }
    }

    pub fn hidden_value(self) -> &'static str {
        match self {
            Self::Display => "none",
            Self::Visibility => "hidden",
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionOptions {
    pub manage_visibility_with: VisibilityMode,
    pub show_transition_classname: Option<String>,
    pub hide_transition_classname: Option<String>,
    /// Skips marker-class detection when set. Non-boolean values are ignored.
    #[serde(deserialize_with = "bool_or_none")]
    pub is_hidden: Option<bool>,
    #[serde(skip)]
    pub on_show_transition_end: Option<ShowEndCallback>,
    #[serde(skip)]
    pub on_hide_transition_end: Option<HideEndCallback>,
}

impl fmt::Debug for TransitionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("manage_visibility_with", &self.manage_visibility_with)
            .field("show_transition_classname", &self.show_transition_classname)
            .field("hide_transition_classname", &self.hide_transition_classname)
            .field("is_hidden", &self.is_hidden)
            .field("on_show_transition_end", &self.on_show_transition_end.is_some())
            .field("on_hide_transition_end", &self.on_hide_transition_end.is_some())
            .finish()
    }
}

impl TransitionOptions {
    pub fn new(show_classname: impl Into<String>, hide_classname: impl Into<String>) -> Self {
        Self {
            show_transition_classname: Some(show_classname.into()),
            hide_transition_classname: Some(hide_classname.into()),
            ..Self::default()
        }
    }

    /// Parse the data part of an option bag. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TransitionError::Configuration(e.to_string()))
    }

    pub fn manage_visibility_with(mut self, mode: VisibilityMode) -> Self {
        self.manage_visibility_with = mode;
        self
    }

    pub fn initially_hidden(mut self, hidden: bool) -> Self {
        self.is_hidden = Some(hidden);
        self
    }

    pub fn on_show_transition_end(mut self, f: impl Fn(&TransitionEnd) + 'static) -> Self {
        self.on_show_transition_end = Some(Rc::new(f));
        self
    }

    pub fn on_hide_transition_end(mut self, f: impl Fn(&TransitionEnd, &str) + 'static) -> Self {
        self.on_hide_transition_end = Some(Rc::new(f));
        self
    }

    pub fn validate(self) -> Result<Settings> {
        let show = non_empty(self.show_transition_classname);
        let hide = non_empty(self.hide_transition_classname);
        let (Some(show_classname), Some(hide_classname)) = (show, hide) else {
            return Err(TransitionError::missing_classnames());
        };
        Ok(Settings {
            manage_visibility_with: self.manage_visibility_with,
            show_classname,
            hide_classname,
            initially_hidden: self.is_hidden,
            on_show_end: self.on_show_transition_end,
            on_hide_end: self.on_hide_transition_end,
        })
    }
}

fn bool_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(Some(b)),
        _ => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Immutable configuration snapshot owned by a controller.
#[derive(Clone)]
pub struct Settings {
    pub manage_visibility_with: VisibilityMode,
    pub show_classname: String,
    pub hide_classname: String,
    pub initially_hidden: Option<bool>,
    pub on_show_end: Option<ShowEndCallback>,
    pub on_hide_end: Option<HideEndCallback>,
}

impl Settings {
    /// Guard shared by construction and every show/hide request.
    pub fn ensure_ready(&self) -> Result<()> {
        if self.show_classname.is_empty() || self.hide_classname.is_empty() {
            return Err(TransitionError::missing_classnames());
        }
        Ok(())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("manage_visibility_with", &self.manage_visibility_with)
            .field("show_classname", &self.show_classname)
            .field("hide_classname", &self.hide_classname)
            .field("initially_hidden", &self.initially_hidden)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_default_mode() {
        let settings = TransitionOptions::new("shown", "hidden").validate().unwrap();
        assert_eq!(settings.manage_visibility_with, VisibilityMode::Display);
        assert_eq!(settings.manage_visibility_with.property(), "display");
        assert_eq!(settings.manage_visibility_with.hidden_value(), "none");
    }

    #[test]
    fn missing_or_blank_classnames_are_rejected() {
        let err = TransitionOptions::default().validate().unwrap_err();
        assert!(matches!(err, TransitionError::Configuration(_)));

        let err = TransitionOptions::new("shown", "  ").validate().unwrap_err();
        assert!(matches!(err, TransitionError::Configuration(_)));
    }

    #[test]
    fn json_options_use_camel_case_and_ignore_unknown_keys() {
        let opts = TransitionOptions::from_json(
            r##"{
                "selector": "#popover",
                "manageVisibilityWith": "visibility",
                "showTransitionClassname": "popover_is_shown",
                "hideTransitionClassname": "popover_is_hidden",
                "isHidden": true
            }"##,
        )
        .unwrap();
        assert_eq!(opts.manage_visibility_with, VisibilityMode::Visibility);
        assert_eq!(opts.is_hidden, Some(true));

        let settings = opts.validate().unwrap();
        assert_eq!(settings.show_classname, "popover_is_shown");
        assert_eq!(settings.hide_classname, "popover_is_hidden");
        assert_eq!(settings.initially_hidden, Some(true));
    }

    #[test]
    fn non_boolean_is_hidden_falls_back_to_detection() {
        for raw in [r#""yes""#, "1", "null", r#"{"a": 1}"#] {
            let json = format!(
                r#"{{"showTransitionClassname": "a", "hideTransitionClassname": "b", "isHidden": {raw}}}"#
            );
            let opts = TransitionOptions::from_json(&json).unwrap();
            assert_eq!(opts.is_hidden, None, "isHidden = {raw}");
        }
        let opts = TransitionOptions::from_json(r#"{"isHidden": false}"#).unwrap();
        assert_eq!(opts.is_hidden, Some(false));
    }

    #[test]
    fn unknown_visibility_mode_is_a_configuration_error() {
        let err = TransitionOptions::from_json(r#"{"manageVisibilityWith": "opacity"}"#)
            .unwrap_err();
        assert!(matches!(err, TransitionError::Configuration(_)));
    }

    #[test]
    fn callbacks_survive_validation() {
        let settings = TransitionOptions::new("a", "b")
            .on_show_transition_end(|_| {})
            .validate()
            .unwrap();
        assert!(settings.on_show_end.is_some());
        assert!(settings.on_hide_end.is_none());
    }
}
