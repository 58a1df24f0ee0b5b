use anyhow::{Context, Result};
use dialoguer::Confirm;

/// Asks the operator a yes/no question.
pub trait Prompt {
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

impl<F> Prompt for F
where
    F: Fn(&str, bool) -> Result<bool>,
{
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        self(question, default)
    }
}

/// Terminal prompt backed by dialoguer.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .context("cannot prompt without a terminal; pass --non-interactive")?)
    }
}

/// Whether an optional step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Enabled,
    Disabled,
}

/// Resolve an optional step: the skip flag wins, non-interactive runs default
/// to enabled, otherwise the operator decides (yes by default).
pub fn resolve_gate(
    skip: bool,
    non_interactive: bool,
    prompt: &dyn Prompt,
    question: &str,
) -> Result<Gate> {
    if skip {
        return Ok(Gate::Disabled);
    }
    if non_interactive {
        return Ok(Gate::Enabled);
    }
    Ok(if prompt.confirm(question, true)? {
        Gate::Enabled
    } else {
        Gate::Disabled
    })
}
