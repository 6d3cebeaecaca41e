// src/handler/messages.rs

//! User-visible texts.

use crate::errors::DownloadError;

pub const USAGE: &str =
    "Please provide a URL after the /download command. Example: /download <video link>";

pub fn starting(url: &str) -> String {
    format!("Starting download for: {url}")
}

pub fn uploading(file_name: &str) -> String {
    format!("Download finished. Uploading {file_name}...")
}

pub fn uploaded(file_name: &str) -> String {
    format!("Uploaded {file_name}.")
}

pub fn caption(url: &str) -> String {
    format!("Download complete: {url}")
}

pub fn delegated(url: &str, strategy: &str) -> String {
    format!("Download for {url} was handed off to {strategy}.")
}

/// One message describing a terminal failure.
pub fn failure(url: &str, error: &DownloadError) -> String {
    match error {
        DownloadError::Input => USAGE.to_string(),
        DownloadError::Upload { file, cause } => format!("Failed to send file {file}: {cause}"),
        DownloadError::Cancelled => format!("Download for {url} was cancelled."),
        other => format!("Download failed for {url}.\nError: {other}"),
    }
}
