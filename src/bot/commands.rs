// src/bot/commands.rs

//! Parsing of bot commands from message text.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/download <url>`; `url` is empty if no argument was given.
    Download { url: String },
    /// `/start` or `/help`.
    Help,
}

fn command_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `/name`, optional `@botname`, then the rest of the message.
    RE.get_or_init(|| Regex::new(r"(?s)^/([A-Za-z0-9_]+)(?:@[A-Za-z0-9_]+)?(?:\s+(.*))?$").expect("static regex is valid"))
}

/// Parse a message. Returns `None` for anything that is not a known command.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let caps = command_regex().captures(text.trim())?;
    let name = caps.get(1)?.as_str().to_ascii_lowercase();
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    match name.as_str() {
        "download" => {
            // Only the first argument is the URL.
            let url = rest.split_whitespace().next().unwrap_or("").to_string();
            Some(BotCommand::Download { url })
        }
        "start" | "help" => Some(BotCommand::Help),
        _ => None,
    }
}
