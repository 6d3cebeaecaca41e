// tests/sanitize.rs

use dlbot::exec::sanitize_restricted;

#[test]
fn punctuation_and_spaces_become_single_underscores() {
    assert_eq!(sanitize_restricted("My Video!"), "My_Video");
    assert_eq!(sanitize_restricted("a  b   c"), "a_b_c");
    assert_eq!(sanitize_restricted("Tom & Jerry (1940)"), "Tom_Jerry_1940");
}

#[test]
fn quotes_and_question_marks_are_dropped() {
    assert_eq!(sanitize_restricted("What?"), "What");
    assert_eq!(sanitize_restricted("say \"hi\""), "say_hi");
}

#[test]
fn colons_and_timestamps() {
    assert_eq!(sanitize_restricted("Part 1: Intro"), "Part_1_-_Intro");
    assert_eq!(sanitize_restricted("Live at 12:34:56"), "Live_at_12_34_56");
}

#[test]
fn accents_are_transliterated() {
    assert_eq!(sanitize_restricted("Café Müller"), "Cafe_Muller");
    assert_eq!(sanitize_restricted("Straße"), "Strasse");
}

#[test]
fn leading_dash_and_dots_are_neutralised() {
    assert_eq!(sanitize_restricted("-rf"), "_rf");
    assert_eq!(sanitize_restricted("...hidden"), "hidden");
    assert_eq!(sanitize_restricted("!!!"), "_");
}

#[test]
fn path_separators_never_survive() {
    let out = sanitize_restricted("../../etc/passwd");
    assert!(!out.contains('/'));
    assert!(!out.starts_with('.'));
}

#[test]
fn plain_extension_is_unchanged() {
    assert_eq!(sanitize_restricted("mp4"), "mp4");
    assert_eq!(sanitize_restricted("webm"), "webm");
}
