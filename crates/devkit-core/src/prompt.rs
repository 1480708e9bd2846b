//! Interactive prompting capability
//!
//! Modules and the orchestrator talk to the user only through [`Prompter`], so
//! the whole lifecycle can be driven by a scripted implementation in tests.
//! The cliclack-backed implementation lives in [`crate::tui`].
//!
//! Cancellation is not represented here: an implementation that observes the
//! user cancelling a prompt terminates the process itself.

use std::io;

/// Validator for free-text input; `Err` carries the message shown before re-prompting
pub type Validator = fn(&str) -> Result<(), String>;

/// One option of a select or multiselect prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub hint: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            hint: String::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }
}

/// Handle of a running spinner
pub trait Progress: Send {
    fn stop(&self, message: &str);

    fn error(&self, message: &str);
}

/// Prompting and reporting capability
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str, initial: bool) -> io::Result<bool>;

    /// Single choice; returns the selected `Choice::value`
    fn select(&self, message: &str, choices: &[Choice], initial: Option<&str>)
        -> io::Result<String>;

    /// Multiple choices; returns the selected values in choice order
    fn multiselect(
        &self,
        message: &str,
        choices: &[Choice],
        initial: &[String],
        required: bool,
    ) -> io::Result<Vec<String>>;

    /// Free text; the validator is re-applied until the input passes
    fn text(&self, message: &str, default: &str, validator: Validator) -> io::Result<String>;

    fn note(&self, title: &str, body: &str);

    fn info(&self, message: &str);

    fn success(&self, message: &str);

    fn warning(&self, message: &str);

    fn error(&self, message: &str);

    fn spinner(&self, message: &str) -> Box<dyn Progress>;
}

/// Validator accepting any non-blank input
pub fn non_empty(input: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        Err("A value is required".to_string())
    } else {
        Ok(())
    }
}

/// Validator accepting a comma-separated list with at least one entry
pub fn comma_list(input: &str) -> Result<(), String> {
    if split_list(input).is_empty() {
        Err("Enter at least one value".to_string())
    } else {
        Ok(())
    }
}

/// Split a comma-separated answer into trimmed, non-empty entries
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
