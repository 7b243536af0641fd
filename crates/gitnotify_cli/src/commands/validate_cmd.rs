//! `validate`: check a notifications document without contacting the service.
//!
//! Optionally previews which rules would fire for a sample webhook event,
//! using the same matching rules the service applies.

use std::{fs, path::PathBuf};

use clap::Args;
use colored::Colorize;
use config_model::{parse_notifications, should_notify, NotificationRule};
use tracing::{debug, instrument};

use crate::errors::Error;

#[cfg(test)]
#[path = "validate_cmd_tests.rs"]
mod tests;

/// Arguments for the validate command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Notifications JSON document to check
    #[arg(long)]
    pub file: PathBuf,

    /// Sample event type (e.g. `pull_request`) to match the rules against
    #[arg(long)]
    pub event: Option<String>,

    /// Sample event action (e.g. `opened`)
    #[arg(long, requires = "event", default_value = "")]
    pub action: String,

    /// Sample repository name
    #[arg(long, requires = "event", default_value = "")]
    pub repo: String,
}

/// A sample webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEvent {
    pub event_type: String,
    pub action: String,
    pub repo: String,
}

/// Result of validating a notifications document.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub rules: Vec<NotificationRule>,
    pub preview: Option<MatchPreview>,
}

/// Which rules a sample event matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPreview {
    pub event: SampleEvent,
    /// Indices of the matching rules.
    pub matching: Vec<usize>,
    pub notifies: bool,
}

impl ValidateArgs {
    fn sample_event(&self) -> Option<SampleEvent> {
        self.event.as_ref().map(|event_type| SampleEvent {
            event_type: event_type.clone(),
            action: self.action.clone(),
            repo: self.repo.clone(),
        })
    }
}

/// Reads and validates the document named in `args`.
///
/// # Errors
///
/// Returns `Error::ReadFile` when the file cannot be read and
/// `Error::Validation` when the document is rejected.
#[instrument]
pub fn execute(args: &ValidateArgs) -> Result<ValidationReport, Error> {
    let text = fs::read_to_string(&args.file).map_err(|source| Error::ReadFile {
        path: args.file.display().to_string(),
        source,
    })?;

    validate_text(&text, args.sample_event())
}

/// Validates `text` and, when `event` is given, previews matching rules.
pub fn validate_text(text: &str, event: Option<SampleEvent>) -> Result<ValidationReport, Error> {
    let rules = parse_notifications(text)?;
    debug!(rule_count = rules.len(), "Notifications document is valid");

    let preview = event.map(|event| {
        let matching = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.matches(&event.event_type, &event.action, &event.repo))
            .map(|(index, _)| index)
            .collect();
        let notifies = should_notify(&rules, &event.event_type, &event.action, &event.repo);
        MatchPreview {
            event,
            matching,
            notifies,
        }
    });

    Ok(ValidationReport { rules, preview })
}

/// Formats a report for the terminal.
pub fn format_report(report: &ValidationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({} rules)\n",
        "✓ Notifications are VALID".green().bold(),
        report.rules.len()
    ));

    for (index, rule) in report.rules.iter().enumerate() {
        output.push_str(&format!(
            "  [{}] {} actions: {} repos: {}\n",
            index,
            rule.event_type.bold(),
            describe_filter(rule.actions()),
            describe_filter(rule.repos()),
        ));
    }

    if let Some(preview) = &report.preview {
        output.push_str(&format!(
            "\n{} {} action={:?} repo={:?}\n",
            "Sample event:".bold(),
            preview.event.event_type,
            preview.event.action,
            preview.event.repo
        ));

        if report.rules.is_empty() {
            output.push_str("  No rules configured; every event notifies\n");
        } else if preview.matching.is_empty() {
            output.push_str(&format!("  {}\n", "No rule matches".dimmed()));
        } else {
            let indices: Vec<String> = preview.matching.iter().map(|i| i.to_string()).collect();
            output.push_str(&format!("  Matching rules: {}\n", indices.join(", ")));
        }

        let verdict = if preview.notifies {
            "would notify".green().bold()
        } else {
            "would not notify".yellow().bold()
        };
        output.push_str(&format!("  Result: {}\n", verdict));
    }

    output
}

fn describe_filter(values: Option<&[String]>) -> String {
    match values {
        Some(values) if !values.is_empty() => values.join(", "),
        _ => "(any)".to_string(),
    }
}
