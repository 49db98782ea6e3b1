//! Output formatting utilities

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print items as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(items: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

/// Print a rounded table, or a warning when there is nothing to show
pub fn print_rows<T: Tabled>(rows: Vec<T>, empty_message: &str) {
    if rows.is_empty() {
        print_warning(empty_message);
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
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

/// Format ready/desired replicas, colored by how far along the rollout is
pub fn format_replicas(ready: i32, desired: i32) -> String {
    let formatted = format!("{}/{}", ready, desired);
    if ready >= desired {
        formatted.green().to_string()
    } else if ready > 0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Format an RFC 3339 timestamp as a short age like `5m`, `3h` or `2d`
pub fn format_age(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(started) = DateTime::parse_from_rfc3339(timestamp) else {
        return "-".to_string();
    };

    let seconds = (now - started.with_timezone(&Utc)).num_seconds().max(0);
    match seconds {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86400),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "succeeded" | "healthy" | "running" | "active" => status.green().to_string(),
        "partial_failure" | "degraded" | "pending" => status.yellow().to_string(),
        "failed" | "unhealthy" | "error" | "terminating" => status.red().to_string(),
        _ => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap();

        assert_eq!(format_age("2024-05-03T11:59:30Z", now), "30s");
        assert_eq!(format_age("2024-05-03T11:15:00+00:00", now), "45m");
        assert_eq!(format_age("2024-05-03T07:00:00Z", now), "5h");
        assert_eq!(format_age("2024-05-01T10:00:00Z", now), "2d");
        assert_eq!(format_age("", now), "-");
    }

    #[test]
    fn test_format_replicas_keeps_counts() {
        colored::control::set_override(false);
        assert_eq!(format_replicas(2, 3), "2/3");
        assert_eq!(format_replicas(0, 0), "0/0");
    }
}
