//! Output formatting.

use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_i18n::t;
use serde::Serialize;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table format
    Table,
    /// JSON format
    Json,
    /// Plain text format
    #[default]
    Plain,
    /// Token-oriented object notation
    Toon,
}

impl OutputFormat {
    /// Whether headers and hints should be printed around the data.
    pub fn is_human(&self) -> bool {
        matches!(self, OutputFormat::Plain)
    }
}

/// Trait for plain text output.
pub trait PlainPrint {
    /// Print as plain text with formatting.
    fn plain_print(&self);
}

/// Trait for table row generation.
pub trait TableRow {
    /// Get table headers.
    fn headers() -> Vec<&'static str>;
    /// Get row data as strings.
    fn row(&self) -> Vec<String>;
}

/// Print items in plain text format.
pub fn print_plain<T: PlainPrint>(items: &[T]) {
    if items.is_empty() {
        println!("{}", t!("no_results"));
        return;
    }
    for item in items {
        item.plain_print();
    }
}

/// Format a timestamp in local time.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Format a timestamp relative to now, falling back to the date after 30 days.
pub fn format_relative_time(time: DateTime<Utc>) -> String {
    relative_to(time, Utc::now())
}

fn relative_to(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - time).num_seconds();

    if diff < 60 {
        t!("just_now").to_string()
    } else if diff < 3600 {
        t!("minutes_ago", count = diff / 60).to_string()
    } else if diff < 86400 {
        t!("hours_ago", count = diff / 3600).to_string()
    } else if diff < 2_592_000 {
        t!("days_ago", count = diff / 86400).to_string()
    } else {
        format_time(time)
    }
}

/// Shorten text to `max` characters for table cells.
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let mut out: String = single_line.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Print a serializable value as JSON or TOON.
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Toon => {
            let json_value = serde_json::to_value(value).unwrap_or_default();
            println!("{}", toon_format::encode_default(&json_value).unwrap_or_default());
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
        }
    }
}

/// Print a table of items with proper formatting for each output mode.
pub fn print_table<T: TableRow + Serialize + PlainPrint>(items: Vec<T>, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Toon => print_structured(&items, format),
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", t!("no_results"));
                return;
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(T::headers());
            for item in &items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        OutputFormat::Plain => {
            print_plain(&items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("line one\nline two", 40), "line one line two");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_relative_time_buckets() {
        rust_i18n::set_locale("en");
        let now = Utc::now();
        assert_eq!(relative_to(now - Duration::seconds(5), now), "just now");
        assert_eq!(relative_to(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_to(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_to(now - Duration::days(2), now), "2d ago");

        let old = now - Duration::days(60);
        assert_eq!(relative_to(old, now), format_time(old));
    }
}
