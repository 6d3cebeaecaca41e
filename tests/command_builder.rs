// tests/command_builder.rs

use std::path::Path;

use dlbot::exec::command::{
    CommandWarning, EXTERNAL_DOWNLOADER_ARGS, PROGRESS_TEMPLATE, build_download_command,
    build_metadata_command,
};
use tempfile::NamedTempFile;

const URL: &str = "https://example.com/watch?v=abc";

#[test]
fn download_args_are_in_fixed_order_with_url_last() {
    let plan = build_download_command(Path::new("yt-dlp"), URL, Path::new("/dl/req"), None);

    let template = Path::new("/dl/req").join("%(title)s.%(ext)s");
    let expected: Vec<String> = vec![
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
        "aria2c".into(),
        "--external-downloader-args".into(),
        EXTERNAL_DOWNLOADER_ARGS.into(),
        "--".into(),
        URL.into(),
    ];

    assert_eq!(plan.args, expected);
    assert_eq!(plan.program, Path::new("yt-dlp"));
    assert!(plan.warnings.is_empty());
}

#[test]
fn existing_cookie_file_is_passed_before_url() {
    let cookies = NamedTempFile::new().unwrap();
    let plan = build_download_command(Path::new("yt-dlp"), URL, Path::new("/dl"), Some(cookies.path()));

    let n = plan.args.len();
    assert_eq!(plan.args[n - 4], "--cookies");
    assert_eq!(plan.args[n - 3], cookies.path().to_string_lossy());
    assert_eq!(plan.args[n - 2], "--");
    assert_eq!(plan.args[n - 1], URL);
    assert!(plan.warnings.is_empty());
}

#[test]
fn missing_cookie_file_is_skipped_with_warning() {
    let missing = Path::new("/definitely/not/here/cookies.txt");
    let plan = build_download_command(Path::new("yt-dlp"), URL, Path::new("/dl"), Some(missing));

    assert!(!plan.args.iter().any(|a| a == "--cookies"));
    assert_eq!(plan.warnings, vec![CommandWarning::CookieFileMissing(missing.to_path_buf())]);
    assert!(plan.warnings[0].to_string().contains("does not exist"));
}

#[test]
fn metadata_mode_is_json_flag_then_url() {
    let plan = build_metadata_command(Path::new("yt-dlp"), URL, None);
    assert_eq!(plan.args, vec!["-j".to_string(), "--".to_string(), URL.to_string()]);

    let cookies = NamedTempFile::new().unwrap();
    let plan = build_metadata_command(Path::new("yt-dlp"), URL, Some(cookies.path()));
    assert_eq!(plan.args[0], "--cookies");
    assert_eq!(&plan.args[2..], &["-j".to_string(), "--".to_string(), URL.to_string()]);
}

#[test]
fn display_line_quotes_arguments_with_spaces() {
    let plan = build_download_command(Path::new("yt-dlp"), URL, Path::new("/dl"), None);
    let line = plan.display_line();
    assert!(line.starts_with("yt-dlp --ignore-errors"));
    assert!(line.contains("\"aria2c:-x16 -s16 -k1M\""));
    assert!(line.ends_with(URL));
}

#[test]
fn option_like_urls_stay_positional() {
    let hostile = "--exec=touch /tmp/owned";
    let download = build_download_command(Path::new("yt-dlp"), hostile, Path::new("/dl"), None);
    let metadata = build_metadata_command(Path::new("yt-dlp"), hostile, None);

    for plan in [download, metadata] {
        let n = plan.args.len();
        assert_eq!(plan.args[n - 2], "--");
        assert_eq!(plan.args[n - 1], hostile);
        assert!(!plan.args[..n - 1].iter().any(|a| a.starts_with("--exec")));
    }
}
