//! `Prompter` backed by cliclack

use crate::prompt::{Choice, Progress, Prompter, Validator};
use std::io;

/// Interactive prompter writing to the terminal.
///
/// Cancelling any prompt (Esc or Ctrl-C) ends the process with status 130.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliclackPrompter;

impl CliclackPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn cancel() -> ! {
    let _ = cliclack::outro_cancel("Cancelled");
    let _ = console::Term::stderr().show_cursor();
    std::process::exit(130);
}

/// Pass answers through, turning an interrupted prompt into process exit
fn answer<T>(result: io::Result<T>) -> io::Result<T> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::Interrupted => cancel(),
        other => other,
    }
}

impl Prompter for CliclackPrompter {
    fn confirm(&self, message: &str, initial: bool) -> io::Result<bool> {
        answer(cliclack::confirm(message).initial_value(initial).interact())
    }

    fn select(
        &self,
        message: &str,
        choices: &[Choice],
        initial: Option<&str>,
    ) -> io::Result<String> {
        let mut prompt = cliclack::select(message);
        for choice in choices {
            prompt = prompt.item(choice.value.clone(), &choice.label, &choice.hint);
        }
        if let Some(initial) = initial {
            prompt = prompt.initial_value(initial.to_string());
        }
        answer(prompt.interact())
    }

    fn multiselect(
        &self,
        message: &str,
        choices: &[Choice],
        initial: &[String],
        required: bool,
    ) -> io::Result<Vec<String>> {
        let mut prompt = cliclack::multiselect(message);
        for choice in choices {
            prompt = prompt.item(choice.value.clone(), &choice.label, &choice.hint);
        }
        let selected = answer(
            prompt
                .initial_values(initial.to_vec())
                .required(required)
                .interact(),
        )?;
        // choice order, whatever order the items were toggled in
        Ok(choices
            .iter()
            .filter(|choice| selected.contains(&choice.value))
            .map(|choice| choice.value.clone())
            .collect())
    }

    fn text(&self, message: &str, default: &str, validator: Validator) -> io::Result<String> {
        let mut prompt = cliclack::input(message).validate(move |input: &String| validator(input));
        if !default.is_empty() {
            prompt = prompt.placeholder(default).default_input(default);
        }
        answer(prompt.interact())
    }

    fn note(&self, title: &str, body: &str) {
        let _ = cliclack::note(title, body);
    }

    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn success(&self, message: &str) {
        let _ = cliclack::log::success(message);
    }

    fn warning(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn error(&self, message: &str) {
        let _ = cliclack::log::error(message);
    }

    fn spinner(&self, message: &str) -> Box<dyn Progress> {
        let spinner = cliclack::spinner();
        spinner.start(message);
        Box::new(Spinner(spinner))
    }
}

struct Spinner(cliclack::ProgressBar);

impl Progress for Spinner {
    fn stop(&self, message: &str) {
        self.0.stop(message);
    }

    fn error(&self, message: &str) {
        self.0.error(message);
    }
}
