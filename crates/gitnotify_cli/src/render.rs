//! Terminal rendering of the configuration form.

use colored::Colorize;
use config_session::{Banner, FormFields, FormModel};

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;

/// Formats a [`FormModel`] for the terminal.
pub fn format_form(model: &FormModel) -> String {
    match model {
        FormModel::Loading => format!("{}\n", "Loading configuration...".dimmed()),
        FormModel::LoadFailed { message } => format!(
            "{}\n  {}\n",
            "✗ Failed to load configuration".red().bold(),
            message
        ),
        FormModel::Form(fields) => format_fields(fields),
    }
}

fn format_fields(fields: &FormFields) -> String {
    let mut output = String::new();

    if let Some(banner) = &fields.banner {
        output.push_str(&format_banner(banner));
        output.push('\n');
    }

    output.push_str(&format!("\n{}\n\n", "GitNotify Configuration".bold().bright_cyan()));
    output.push_str(&format!("{}: {}\n", "Organization".bold(), fields.organization));
    output.push_str(&format!("{}: {}\n", "Port".bold(), fields.port));

    let secret = if fields.webhook_secret.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        fields.webhook_secret.clone()
    };
    output.push_str(&format!("{}: {}\n", "Webhook Secret".bold(), secret));

    output.push_str(&format!("\n{}\n", "Notifications:".bold()));
    for line in fields.notifications_text.lines() {
        output.push_str(&format!("  {}\n", line));
    }

    if fields.saving {
        output.push_str(&format!("\n{}\n", "Saving...".yellow()));
    } else if fields.dirty {
        output.push_str(&format!("\n{}\n", "Unsaved changes".yellow()));
    }

    output
}

/// Formats a banner line.
pub fn format_banner(banner: &Banner) -> String {
    match banner {
        Banner::Success(message) => format!("{} {}", "✓".green(), message.green().bold()),
        Banner::Error(message) => format!("{} {}", "✗".red(), message.red().bold()),
    }
}
