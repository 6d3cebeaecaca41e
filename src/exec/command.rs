// src/exec/command.rs

//! Argument vectors for the two engine invocations.
//!
//! Download mode writes into a per-request directory using the engine's own
//! `%(title)s.%(ext)s` template; metadata mode (`-j`) prints one JSON object
//! describing the same URL.

use std::fmt;
use std::path::{Path, PathBuf};

/// Output name template, relative to the request directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Ends option parsing so a URL starting with `-` is never read as a flag.
pub const END_OF_OPTIONS: &str = "--";

/// Progress template: one JSON object per progress tick.
pub const PROGRESS_TEMPLATE: &str = "%(progress)j";

pub const EXTERNAL_DOWNLOADER: &str = "aria2c";

/// 16 connections, 16 splits, 1 MiB minimum split size.
pub const EXTERNAL_DOWNLOADER_ARGS: &str = "aria2c:-x16 -s16 -k1M";

/// Non-fatal problem noticed while building a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandWarning {
    /// A cookie file was configured but does not exist; `--cookies` omitted.
    CookieFileMissing(PathBuf),
}

impl fmt::Display for CommandWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandWarning::CookieFileMissing(p) => {
                write!(f, "cookie file {} does not exist; continuing without it", p.display())
            }
        }
    }
}

/// A ready-to-spawn engine invocation.
#[derive(Debug, Clone)]
pub struct CommandPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub warnings: Vec<CommandWarning>,
}

impl CommandPlan {
    /// Shell-ish rendering for logs. Not meant to be re-parsed.
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Build the download-mode invocation. The URL is always the last argument,
/// directly after `--`.
pub fn build_download_command(
    program: &Path,
    url: &str,
    output_dir: &Path,
    cookie_file: Option<&Path>,
) -> CommandPlan {
    let template = output_dir.join(OUTPUT_TEMPLATE);

    let mut args: Vec<String> = vec![
        "--ignore-errors".into(),
        "--restrict-filenames".into(),
        "--no-warnings".into(),
        "--newline".into(),
        "--progress".into(),
        "--progress-template".into(),
        PROGRESS_TEMPLATE.into(),
        "-o".into(),
        template.to_string_lossy().into_owned(),
        "--external-downloader".into(),
        EXTERNAL_DOWNLOADER.into(),
        "--external-downloader-args".into(),
        EXTERNAL_DOWNLOADER_ARGS.into(),
    ];

    let mut warnings = Vec::new();
    push_cookie_args(&mut args, &mut warnings, cookie_file);
    args.push(END_OF_OPTIONS.into());
    args.push(url.to_string());

    CommandPlan {
        program: program.to_path_buf(),
        args,
        warnings,
    }
}

/// Build the metadata-mode (`-j`) invocation for the same URL.
pub fn build_metadata_command(program: &Path, url: &str, cookie_file: Option<&Path>) -> CommandPlan {
    let mut args = Vec::new();
    let mut warnings = Vec::new();
    push_cookie_args(&mut args, &mut warnings, cookie_file);
    args.push("-j".into());
    args.push(END_OF_OPTIONS.into());
    args.push(url.to_string());

    CommandPlan {
        program: program.to_path_buf(),
        args,
        warnings,
    }
}

fn push_cookie_args(
    args: &mut Vec<String>,
    warnings: &mut Vec<CommandWarning>,
    cookie_file: Option<&Path>,
) {
    let Some(path) = cookie_file else {
        return;
    };

    if path.is_file() {
        args.push("--cookies".into());
        args.push(path.to_string_lossy().into_owned());
    } else {
        warnings.push(CommandWarning::CookieFileMissing(path.to_path_buf()));
    }
}
