// src/exec/sanitize.rs

//! Filename sanitization matching the engine's `--restrict-filenames` mode.
//!
//! Used only to reconstruct a candidate path when the metadata record has no
//! explicit `filepath`. It is a best-effort mirror: characters outside the
//! Latin accent table are replaced by `_` rather than classified by Unicode
//! category.

use std::sync::OnceLock;

use regex::Regex;

/// Sanitize a title (or extension) the way restricted mode does.
pub fn sanitize_restricted(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    // Timestamps like 12:34:56 become 12_34_56 before the ':' rule applies.
    let s = timestamp_regex().replace_all(s, |caps: &regex::Captures<'_>| caps[0].replace(':', "_"));

    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        replace_char(ch, &mut out);
    }

    let mut result = collapse_underscores(&out);
    result = result.trim_matches('_').to_string();

    if let Some(rest) = result.strip_prefix("-_") {
        result = rest.to_string();
    }
    if let Some(rest) = result.strip_prefix('-') {
        result = format!("_{rest}");
    }
    let result = result.trim_start_matches('.');

    if result.is_empty() {
        "_".to_string()
    } else {
        result.to_string()
    }
}

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?::[0-9]+)+").expect("static regex is valid"))
}

fn replace_char(ch: char, out: &mut String) {
    if let Some(ascii) = transliterate(ch) {
        out.push_str(ascii);
        return;
    }

    match ch {
        '?' | '"' => {}
        c if (c as u32) < 32 || c as u32 == 127 => {}
        ':' => out.push_str("_-"),
        '\\' | '/' | '|' | '*' | '<' | '>' => out.push('_'),
        '!' | '&' | '\'' | '(' | ')' | '[' | ']' | '{' | '}' | '$' | ';' | '`' | '^' | ',' | '#' => {
            out.push('_')
        }
        c if c.is_whitespace() || !c.is_ascii() => out.push('_'),
        c => out.push(c),
    }
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for ch in s.chars() {
        if ch == '_' {
            if !prev_underscore {
                out.push(ch);
            }
            prev_underscore = true;
        } else {
            out.push(ch);
            prev_underscore = false;
        }
    }
    out
}

fn transliterate(ch: char) -> Option<&'static str> {
    let s = match ch {
        'Â' | 'Ã' | 'Ä' | 'À' | 'Á' | 'Å' => "A",
        'Æ' => "AE",
        'Ç' => "C",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'Ð' => "D",
        'Ñ' => "N",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ő' | 'Ø' => "O",
        'Œ' => "OE",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ű' => "U",
        'Ý' => "Y",
        'Þ' => "TH",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ð' => "o",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ő' | 'ø' => "o",
        'œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'þ' => "th",
        _ => return None,
    };
    Some(s)
}
