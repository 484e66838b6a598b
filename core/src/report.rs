//! Plain-text reports offered as downloads for history entries.

use crate::interface::{HistoryEntry, Label};
use std::fmt::Write;

pub fn report_file_name(entry: &HistoryEntry) -> String {
    format!("retina_report_{}.txt", entry.id)
}

pub fn render_report(entry: &HistoryEntry) -> String {
    let mut text = String::new();
    text.push_str("Retina Analysis Report\n");
    text.push_str("-------------------------\n");
    let _ = writeln!(text, "File: {}", entry.name);
    let _ = writeln!(text, "Time: {}", entry.timestamp);
    let _ = writeln!(text, "Detected: {}", entry.label);
    text.push_str("\nConfidences:\n");
    for label in Label::ALL {
        let _ = writeln!(text, "{}: {:.2}%", label, entry.confidences.get(label) * 100.0);
    }
    text
}
