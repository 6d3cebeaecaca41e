//! A scripted stand-in for the download engine.
//!
//! `build()` writes a `/bin/sh` script that understands the two invocation
//! shapes the bot uses:
//! - download mode (`... -o DIR/%(title)s.%(ext)s URL`): prints the configured
//!   progress and stderr lines, optionally sleeps, creates `DIR/STEM.EXT` and
//!   exits with the configured code;
//! - metadata mode (`-j URL`): prints one metadata JSON object pointing at
//!   the directory of the last download run.
//!
//! Every invocation's arguments are appended to a log file.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

pub struct FakeEngine {
    _dir: TempDir,
    script: PathBuf,
    log: PathBuf,
}

impl FakeEngine {
    pub fn builder() -> FakeEngineBuilder {
        FakeEngineBuilder::default()
    }

    /// Path to use as the engine binary.
    pub fn path(&self) -> &Path {
        &self.script
    }

    /// One entry per invocation: the arguments joined by spaces.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// A `downloading` progress record.
    pub fn progress_line(downloaded: u64, total: u64) -> String {
        json!({
            "status": "downloading",
            "downloaded_bytes": downloaded,
            "total_bytes": total,
            "speed": 1048576.0,
            "eta": 5,
        })
        .to_string()
    }

    pub fn finished_line(total: u64) -> String {
        json!({
            "status": "finished",
            "downloaded_bytes": total,
            "total_bytes": total,
        })
        .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct FakeEngineBuilder {
    title: String,
    file_stem: String,
    ext: String,
    stdout: Vec<String>,
    stderr: Vec<String>,
    exit_code: i32,
    create_file: bool,
    include_filepath: bool,
    metadata_exit_code: i32,
    metadata_stderr: Option<String>,
    sleep_secs: Option<u32>,
    ignore_sigterm: bool,
}

impl Default for FakeEngineBuilder {
    fn default() -> Self {
        Self {
            title: "My Video!".to_string(),
            file_stem: "My_Video".to_string(),
            ext: "mp4".to_string(),
            stdout: vec![
                FakeEngine::progress_line(512 * 1024, 1024 * 1024),
                FakeEngine::progress_line(1024 * 1024, 1024 * 1024),
                FakeEngine::finished_line(1024 * 1024),
            ],
            stderr: Vec::new(),
            exit_code: 0,
            create_file: true,
            include_filepath: true,
            metadata_exit_code: 0,
            metadata_stderr: None,
            sleep_secs: None,
            ignore_sigterm: false,
        }
    }
}

impl FakeEngineBuilder {
    /// Title reported in metadata mode.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Stem of the file created in download mode.
    pub fn file_stem(mut self, stem: &str) -> Self {
        self.file_stem = stem.to_string();
        self
    }

    pub fn ext(mut self, ext: &str) -> Self {
        self.ext = ext.to_string();
        self
    }

    /// Replace the stdout lines printed in download mode.
    pub fn stdout_lines(mut self, lines: Vec<String>) -> Self {
        self.stdout = lines;
        self
    }

    pub fn stderr_line(mut self, line: &str) -> Self {
        self.stderr.push(line.to_string());
        self
    }

    /// Exit code of download mode; a non-zero code also skips the file.
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        if code != 0 {
            self.create_file = false;
        }
        self
    }

    /// Exit 0 without creating the file.
    pub fn no_file(mut self) -> Self {
        self.create_file = false;
        self
    }

    /// Leave `filepath` out of the metadata record.
    pub fn without_filepath(mut self) -> Self {
        self.include_filepath = false;
        self
    }

    pub fn metadata_failure(mut self, code: i32, stderr: &str) -> Self {
        self.metadata_exit_code = code;
        self.metadata_stderr = Some(stderr.to_string());
        self
    }

    /// Sleep in download mode after printing output.
    pub fn sleep_secs(mut self, secs: u32) -> Self {
        self.sleep_secs = Some(secs);
        self
    }

    pub fn ignore_sigterm(mut self) -> Self {
        self.ignore_sigterm = true;
        self
    }

    pub fn build(self) -> FakeEngine {
        let dir = tempfile::tempdir().expect("create fake engine dir");
        let script = dir.path().join("fake-engine");
        let log = dir.path().join("invocations.log");
        let state = dir.path().join("last_output_dir");

        let body = self.render(&log, &state);
        fs::write(&script, body).expect("write fake engine script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("make fake engine executable");

        FakeEngine {
            _dir: dir,
            script,
            log,
        }
    }

    fn render(&self, log: &Path, state: &Path) -> String {
        let file = format!("{}.{}", self.file_stem, self.ext);
        let mut s = String::from("#!/bin/sh\n");

        s.push_str(&format!("LOG={}\n", sh_quote(&log.display().to_string())));
        s.push_str(&format!("STATE={}\n", sh_quote(&state.display().to_string())));
        s.push_str("printf '%s\\n' \"$*\" >> \"$LOG\"\n");
        s.push_str("mode=download\nout=\nprev=\n");
        s.push_str("for arg in \"$@\"; do\n");
        s.push_str("  if [ \"$prev\" = \"-o\" ]; then out=\"$arg\"; fi\n");
        s.push_str("  if [ \"$arg\" = \"-j\" ]; then mode=metadata; fi\n");
        s.push_str("  prev=\"$arg\"\n");
        s.push_str("done\n");

        // Metadata mode.
        s.push_str("if [ \"$mode\" = \"metadata\" ]; then\n");
        s.push_str("  dir=$(cat \"$STATE\" 2>/dev/null)\n");
        if let Some(stderr) = &self.metadata_stderr {
            s.push_str(&format!("  printf '%s\\n' {} >&2\n", sh_quote(stderr)));
        }
        if self.metadata_exit_code != 0 {
            s.push_str(&format!("  exit {}\n", self.metadata_exit_code));
        }
        let title = json!(self.title).to_string();
        let ext = json!(self.ext).to_string();
        if self.include_filepath {
            let prefix = format!("{{\"title\":{title},\"ext\":{ext},\"filepath\":\"");
            let suffix = format!("/{file}\"}}");
            s.push_str(&format!(
                "  printf '%s\\n' {}\"$dir\"{}\n",
                sh_quote(&prefix),
                sh_quote(&suffix)
            ));
        } else {
            let record = format!("{{\"title\":{title},\"ext\":{ext}}}");
            s.push_str(&format!("  printf '%s\\n' {}\n", sh_quote(&record)));
        }
        s.push_str("  exit 0\nfi\n");

        // Download mode.
        s.push_str("dir=$(dirname \"$out\")\n");
        s.push_str("printf '%s\\n' \"$dir\" > \"$STATE\"\n");
        if self.ignore_sigterm {
            s.push_str("trap '' TERM\n");
        }
        for line in &self.stdout {
            s.push_str(&format!("printf '%s\\n' {}\n", sh_quote(line)));
        }
        for line in &self.stderr {
            s.push_str(&format!("printf '%s\\n' {} >&2\n", sh_quote(line)));
        }
        if let Some(secs) = self.sleep_secs {
            s.push_str(&format!("sleep {secs}\n"));
        }
        if self.create_file {
            s.push_str(&format!(
                "printf 'fake media\\n' > \"$dir\"/{}\n",
                sh_quote(&file)
            ));
        }
        s.push_str(&format!("exit {}\n", self.exit_code));
        s
    }
}

fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
