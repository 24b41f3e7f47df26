//! Delimited-text artifacts: rank table, metrics table, and the append-only
//! prediction log. Every writer moves an existing file at its target path to
//! `<path>.bak` before writing.

pub mod backup;
pub mod predictions;
pub mod tables;

pub use backup::{backup_existing, backup_path};
pub use predictions::{read_predictions, PredictionLog};
pub use tables::{write_metrics_table, write_rank_table};

/// Quote a field when it would otherwise break comma splitting or lose
/// leading/trailing whitespace on read.
pub(crate) fn escape_field(field: &str) -> String {
    let needs_quotes = field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r'))
        || field.trim() != field;
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Inverse of [`escape_field`]. Whitespace outside quotes is dropped; inside
/// quotes it is kept.
pub(crate) fn unescape_field(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}
