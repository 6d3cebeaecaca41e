// src/progress/decoder.rs

//! Line-by-line decoding of the engine's progress stream.
//!
//! With `--progress-template "%(progress)j"` the engine prints one JSON object
//! per tick. Everything else on the stream (warnings, merger output, errors)
//! is plain text. A line that fails to parse is never an error: it is just
//! [`Decoded::Unstructured`].

use serde_json::{Map, Value};

/// Lifecycle state reported by one progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Extracting,
    Finished,
    Unknown,
}

impl ProgressStatus {
    fn from_status_str(s: &str) -> Self {
        match s {
            "downloading" => ProgressStatus::Downloading,
            "extracting" => ProgressStatus::Extracting,
            "finished" => ProgressStatus::Finished,
            _ => ProgressStatus::Unknown,
        }
    }
}

/// Snapshot of download state decoded from one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub status: ProgressStatus,
    /// Completed fraction in `[0, 1]`.
    pub fraction: Option<f64>,
    pub downloaded_bytes: Option<u64>,
    /// Exact or estimated total size.
    pub total_bytes: Option<u64>,
    pub speed: Option<f64>,
    pub eta: Option<u64>,
}

impl ProgressRecord {
    pub fn new(status: ProgressStatus) -> Self {
        Self {
            status,
            fraction: None,
            downloaded_bytes: None,
            total_bytes: None,
            speed: None,
            eta: None,
        }
    }
}

/// Classification of one output line.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// `downloading` / `extracting`: report it.
    Progress(ProgressRecord),
    /// `finished`: terminal; the caller stops reporting progress.
    Finished(ProgressRecord),
    /// Structured record with a status we don't report (logged only).
    Informational(String),
    /// Not a progress record at all.
    Unstructured(String),
}

/// Decode one line. Blank lines yield `None`.
pub fn decode_line(line: &str) -> Option<Decoded> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(obj) = parse_object(line) else {
        return Some(Decoded::Unstructured(line.to_string()));
    };

    let Some(status_str) = obj.get("status").and_then(Value::as_str) else {
        return Some(Decoded::Unstructured(line.to_string()));
    };

    let status = ProgressStatus::from_status_str(status_str);
    let record = record_from_object(status, &obj);

    let decoded = match status {
        ProgressStatus::Downloading | ProgressStatus::Extracting => Decoded::Progress(record),
        ProgressStatus::Finished => Decoded::Finished(record),
        ProgressStatus::Unknown => Decoded::Informational(status_str.to_string()),
    };
    Some(decoded)
}

fn parse_object(line: &str) -> Option<Map<String, Value>> {
    // Cheap pre-check; most diagnostic lines start with '[' or a letter.
    if !line.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn record_from_object(status: ProgressStatus, obj: &Map<String, Value>) -> ProgressRecord {
    let downloaded_bytes = number(obj, "downloaded_bytes").and_then(non_negative_u64);
    let total_bytes = number(obj, "total_bytes")
        .or_else(|| number(obj, "total_bytes_estimate"))
        .and_then(non_negative_u64)
        .filter(|&t| t > 0);

    let fraction = number(obj, "fraction_downloaded")
        .or_else(|| match (downloaded_bytes, total_bytes) {
            (Some(done), Some(total)) => Some(done as f64 / total as f64),
            _ => None,
        })
        .filter(|f| f.is_finite())
        .map(|f| f.clamp(0.0, 1.0));

    ProgressRecord {
        status,
        fraction,
        downloaded_bytes,
        total_bytes,
        speed: number(obj, "speed").filter(|s| s.is_finite() && *s >= 0.0),
        eta: number(obj, "eta").and_then(non_negative_u64),
    }
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn non_negative_u64(v: f64) -> Option<u64> {
    if v.is_finite() && v >= 0.0 {
        Some(v.round() as u64)
    } else {
        None
    }
}
