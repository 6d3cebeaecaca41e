// tests/progress_decoding.rs

use dlbot::progress::{
    Decoded, ProgressRecord, ProgressStatus, decode_line, format_bytes, format_eta, format_percent,
    format_speed, render_progress,
};

#[test]
fn downloading_record_with_byte_counts_yields_fraction() {
    let line = r#"{"status":"downloading","downloaded_bytes":512,"total_bytes":2048,"speed":1024.0,"eta":3}"#;
    let Some(Decoded::Progress(rec)) = decode_line(line) else {
        panic!("expected a progress record");
    };
    assert_eq!(rec.status, ProgressStatus::Downloading);
    assert_eq!(rec.fraction, Some(0.25));
    assert_eq!(rec.downloaded_bytes, Some(512));
    assert_eq!(rec.total_bytes, Some(2048));
    assert_eq!(rec.speed, Some(1024.0));
    assert_eq!(rec.eta, Some(3));
}

#[test]
fn estimated_total_is_used_when_exact_total_missing() {
    let line = r#"{"status":"downloading","downloaded_bytes":50,"total_bytes_estimate":200}"#;
    let Some(Decoded::Progress(rec)) = decode_line(line) else {
        panic!("expected a progress record");
    };
    assert_eq!(rec.total_bytes, Some(200));
    assert_eq!(rec.fraction, Some(0.25));
}

#[test]
fn explicit_fraction_wins_and_is_clamped() {
    let line = r#"{"status":"downloading","fraction_downloaded":1.7,"downloaded_bytes":1,"total_bytes":4}"#;
    let Some(Decoded::Progress(rec)) = decode_line(line) else {
        panic!("expected a progress record");
    };
    assert_eq!(rec.fraction, Some(1.0));
}

#[test]
fn zero_total_gives_no_fraction() {
    let line = r#"{"status":"downloading","downloaded_bytes":10,"total_bytes":0}"#;
    let Some(Decoded::Progress(rec)) = decode_line(line) else {
        panic!("expected a progress record");
    };
    assert_eq!(rec.total_bytes, None);
    assert_eq!(rec.fraction, None);
}

#[test]
fn finished_and_unknown_statuses() {
    assert!(matches!(
        decode_line(r#"{"status":"finished","total_bytes":10}"#),
        Some(Decoded::Finished(_))
    ));
    assert_eq!(
        decode_line(r#"{"status":"postprocessing"}"#),
        Some(Decoded::Informational("postprocessing".to_string()))
    );
}

#[test]
fn malformed_and_plain_lines_are_unstructured() {
    for line in [
        "[download] Destination: foo.mp4",
        "{not json",
        r#"{"no_status":true}"#,
        r#"["status","downloading"]"#,
        "ERROR: network unreachable",
    ] {
        match decode_line(line) {
            Some(Decoded::Unstructured(text)) => assert_eq!(text, line),
            other => panic!("{line:?} decoded as {other:?}"),
        }
    }
}

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(decode_line(""), None);
    assert_eq!(decode_line("   \r"), None);
}

#[test]
fn formatting_helpers() {
    assert_eq!(format_percent(0.4531), "45.3%");
    assert_eq!(format_percent(1.0), "100.0%");
    assert_eq!(format_bytes(512.0), "0.50 KiB");
    assert_eq!(format_bytes(3.0 * 1024.0 * 1024.0), "3.00 MiB");
    assert_eq!(format_eta(42), "42s");
    assert_eq!(format_eta(65), "1m 5s");
    assert_eq!(format_speed(None), "N/A");
    assert_eq!(format_speed(Some(0.0)), "N/A");
    assert_eq!(format_speed(Some(2048.0)), "2.00 KiB/s");
}

#[test]
fn rendered_progress_text() {
    let rec = ProgressRecord {
        status: ProgressStatus::Downloading,
        fraction: Some(0.5),
        downloaded_bytes: Some(1024 * 1024),
        total_bytes: Some(2 * 1024 * 1024),
        speed: Some(1024.0 * 1024.0),
        eta: Some(1),
    };
    assert_eq!(
        render_progress(&rec),
        "Downloading: 50.0%\n1.00 MiB / 2.00 MiB\nSpeed: 1.00 MiB/s | ETA: 1s"
    );

    let unknown = ProgressRecord::new(ProgressStatus::Extracting);
    assert_eq!(render_progress(&unknown), "Extracting...\nSpeed: N/A | ETA: N/A");
}
