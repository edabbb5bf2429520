//! Prompts
//!
//! Interactive terminal prompts for the studio session.
//! Uses the `dialoguer` crate for input handling.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use regex::Regex;

use crate::types::{Permission, Permissions};

/// Prompt the user for a required string value.
/// Repeats until a non-empty value is entered.
pub fn prompt_required(label: &str) -> Result<String> {
    loop {
        let value: String = Input::new()
            .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
            .allow_empty(true)
            .interact_text()?;

        let trimmed = value.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
        println!("{}", "  This field is required.".yellow());
    }
}

/// Prompt the user for a web application URL with validation.
/// Must start with http:// or https://.
pub fn prompt_url(label: &str) -> Result<String> {
    let re = Regex::new(r"^https?://\S+$")?;

    loop {
        let value: String = Input::new()
            .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
            .allow_empty(true)
            .interact_text()?;

        let trimmed = value.trim().to_string();
        if re.is_match(&trimmed) {
            return Ok(trimmed);
        }
        println!(
            "{}",
            "  Invalid URL. Must start with http:// or https://.".yellow()
        );
    }
}

/// Prompt the user for a hex color, offering the current value as default.
pub fn prompt_hex_color(label: &str, default: &str) -> Result<String> {
    let re = Regex::new(r"^#[0-9a-fA-F]{6}$")?;

    loop {
        let value: String = Input::new()
            .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
            .default(default.to_string())
            .interact_text()?;

        let trimmed = value.trim().to_string();
        if re.is_match(&trimmed) {
            return Ok(trimmed);
        }
        println!(
            "{}",
            "  Invalid color. Use a six-digit hex value like #4f46e5.".yellow()
        );
    }
}

/// Prompt the user for a string value, offering a default.
pub fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
        .default(default.to_string())
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Offer a list of choices and return the selected index.
pub fn select(label: &str, items: &[&str], default: usize) -> Result<usize> {
    let index = Select::new()
        .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
        .items(items)
        .default(default)
        .interact()?;
    Ok(index)
}

/// Ask a yes/no question.
pub fn confirm(label: &str, default: bool) -> Result<bool> {
    let answer = Confirm::new()
        .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
        .default(default)
        .interact()?;
    Ok(answer)
}

/// Toggle the runtime bridge permissions, pre-checking the current set.
pub fn toggle_permissions(current: &Permissions) -> Result<Permissions> {
    let labels: Vec<&str> = Permission::ALL.iter().map(|p| p.label()).collect();
    let defaults: Vec<bool> = Permission::ALL.iter().map(|p| current.get(*p)).collect();

    let selected = MultiSelect::new()
        .with_prompt(format!(
            "  {} {}",
            "\u{2192}".cyan(),
            "Runtime bridge permissions (space to toggle)".white()
        ))
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    let mut permissions = Permissions::default();
    for index in selected {
        permissions.set(Permission::ALL[index], true);
    }
    Ok(permissions)
}
