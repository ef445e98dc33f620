//! Output formatting utilities

use aqi_lib::Category;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format an index value
pub fn format_aqi(aqi: f64) -> String {
    if aqi.is_finite() {
        format!("{:.0}", aqi)
    } else {
        "n/a".to_string()
    }
}

/// Format a metric, showing NaN as n/a
pub fn format_metric(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.3}", value)
    }
}

pub fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, unit),
        None => "-".to_string(),
    }
}

/// Parse a `#RRGGBB` color
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Category label in its band color
pub fn color_category(category: Option<Category>) -> ColoredString {
    match category {
        Some(c) => match hex_rgb(c.color()) {
            Some((r, g, b)) => c.label().truecolor(r, g, b).bold(),
            None => c.label().normal(),
        },
        None => "Unknown".dimmed(),
    }
}

/// Color R² based on value
pub fn color_r_squared(r_squared: f64) -> String {
    let formatted = format_metric(r_squared);
    if r_squared.is_nan() {
        formatted.dimmed().to_string()
    } else if r_squared >= 0.8 {
        formatted.green().to_string()
    } else if r_squared >= 0.5 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}
