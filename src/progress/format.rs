// src/progress/format.rs

//! Human-readable rendering of progress records.

use crate::progress::decoder::{ProgressRecord, ProgressStatus};

const MIB: f64 = 1024.0 * 1024.0;

/// Text shown once the engine reports `finished`.
pub const COMPLETION_TEXT: &str = "Download finished. Preparing file...";

/// `0.4531` -> `"45.3%"`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// KiB below 1 MiB, MiB from there on.
pub fn format_bytes(bytes: f64) -> String {
    if bytes < MIB {
        format!("{:.2} KiB", bytes / 1024.0)
    } else {
        format!("{:.2} MiB", bytes / MIB)
    }
}

/// `65` -> `"1m 5s"`, `42` -> `"42s"`.
pub fn format_eta(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

pub fn format_speed(speed: Option<f64>) -> String {
    match speed {
        Some(s) if s > 0.0 => format!("{}/s", format_bytes(s)),
        _ => "N/A".to_string(),
    }
}

/// Render a status message for a `downloading` / `extracting` record.
pub fn render_progress(record: &ProgressRecord) -> String {
    let verb = match record.status {
        ProgressStatus::Extracting => "Extracting",
        _ => "Downloading",
    };

    let mut text = match record.fraction {
        Some(f) => format!("{verb}: {}", format_percent(f)),
        None => format!("{verb}..."),
    };

    match (record.downloaded_bytes, record.total_bytes) {
        (Some(done), Some(total)) => {
            text.push_str(&format!("\n{} / {}", format_bytes(done as f64), format_bytes(total as f64)));
        }
        (Some(done), None) => {
            text.push_str(&format!("\n{}", format_bytes(done as f64)));
        }
        _ => {}
    }

    let eta = record.eta.map(format_eta).unwrap_or_else(|| "N/A".to_string());
    text.push_str(&format!("\nSpeed: {} | ETA: {}", format_speed(record.speed), eta));

    text
}
