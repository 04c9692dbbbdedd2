//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Renders rows as a rounded table.
pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Prints a list result.
///
/// Tables print `rows`; JSON prints `document`, which lets a command emit
/// richer JSON (totals, warnings) than its table shows. Quiet prints one
/// identifier per row that has one.
pub fn output<T, D>(
    rows: &[T],
    document: &D,
    format: OutputFormat,
    id: impl Fn(&T) -> Option<&str>,
) -> crate::CliResult<()>
where
    T: Tabled,
    D: Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                info("No results found.");
            } else {
                println!("{}", render_table(rows));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(document)?),
        OutputFormat::Quiet => {
            for line in quiet_lines(rows, id) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Identifiers printed in quiet mode, skipping rows without one.
pub fn quiet_lines<'a, T>(rows: &'a [T], id: impl Fn(&'a T) -> Option<&'a str>) -> Vec<&'a str> {
    rows.iter().filter_map(id).collect()
}

/// Outputs a single item.
pub fn output_single<T: Serialize>(item: &T, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            for line in field_lines(&serde_json::to_value(item)?) {
                println!("{line}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// `key: value` lines for a flat JSON object; nested values print as JSON.
fn field_lines(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, val)| match val {
                serde_json::Value::String(s) => format!("{key}: {s}"),
                other => format!("{key}: {other}"),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

/// Prompts for password input (hidden).
pub fn prompt_password(prompt: &str) -> crate::CliResult<String> {
    Ok(rpassword::prompt_password(prompt)?)
}

/// Prompts twice and requires both entries to match.
pub fn prompt_new_password() -> crate::CliResult<String> {
    let password = prompt_password("Enter new password: ")?;
    let confirmation = prompt_password("Confirm password: ")?;
    if password != confirmation {
        return Err(crate::CliError::Validation("passwords do not match".to_string()));
    }
    Ok(password)
}

/// Prompts for a line of input, returning `current` on an empty answer.
pub fn prompt_line(label: &str, current: &str) -> crate::CliResult<String> {
    print!("{label} [{current}]: ");
    std::io::Write::flush(&mut std::io::stdout())?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    Ok(if trimmed.is_empty() {
        current.to_string()
    } else {
        trimmed.to_string()
    })
}
