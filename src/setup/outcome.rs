use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::ui::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Done,
    Skipped,
    Warned,
}

impl StepStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Done => "DONE",
            StepStatus::Skipped => "SKIP",
            StepStatus::Warned => "WARN",
        }
    }

    fn table_color(&self) -> Color {
        match self {
            StepStatus::Done => Color::Green,
            StepStatus::Skipped => Color::DarkGrey,
            StepStatus::Warned => Color::Yellow,
        }
    }
}

/// What one pipeline step did, plus anything the operator should follow up on.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: &'static str,
    pub status: StepStatus,
    pub detail: String,
    pub hints: Vec<String>,
}

impl StepOutcome {
    pub fn new(step: &'static str) -> Self {
        Self {
            step,
            status: StepStatus::Done,
            detail: String::new(),
            hints: Vec::new(),
        }
    }

    pub fn skipped(step: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Skipped,
            detail: detail.into(),
            ..Self::new(step)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Emit an advisory and remember it. The first warning becomes the detail
    /// unless the step already set one.
    pub fn warn(&mut self, code: &str, message: &str, hint: Option<&str>) {
        emit(Level::Warn, code, message, None);
        self.status = StepStatus::Warned;
        if self.detail.is_empty() {
            self.detail = message.to_string();
        }
        if let Some(hint) = hint {
            self.hints.push(hint.to_string());
        }
    }

    pub fn is_warned(&self) -> bool {
        self.status == StepStatus::Warned
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub steps: Vec<StepOutcome>,
}

impl Summary {
    pub fn push(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    #[cfg(test)]
    pub fn get(&self, step: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|o| o.step == step)
    }

    pub fn warning_count(&self) -> usize {
        self.steps.iter().filter(|o| o.is_warned()).count()
    }

    /// Remediation hints in order of appearance, without repeats.
    pub fn hints(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for hint in self.steps.iter().flat_map(|o| o.hints.iter()) {
            if !seen.contains(&hint.as_str()) {
                seen.push(hint);
            }
        }
        seen
    }

    pub fn print(&self) {
        if get_output_format() == OutputFormat::Json {
            let data = serde_json::to_value(self).ok();
            emit(Level::Info, "summary", "Setup finished", data);
            return;
        }

        section("Summary");
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Step", "Status", "Details"]);
        for outcome in &self.steps {
            table.add_row(vec![
                Cell::new(outcome.step),
                Cell::new(outcome.status.label()).fg(outcome.status.table_color()),
                Cell::new(&outcome.detail),
            ]);
        }
        println!("{table}");

        let hints = self.hints();
        if hints.is_empty() {
            emit(
                Level::Success,
                "summary.ok",
                "Rootless Podman is ready.",
                None,
            );
            return;
        }

        let header = format!(
            "Next steps ({} step(s) reported warnings):",
            self.warning_count()
        );
        println!("\n{}", header.bold().yellow());
        for hint in hints {
            println!("  - {hint}");
        }
    }
}
