// tests/bot_commands.rs

use dlbot::bot::{BotCommand, ChatKind, parse_command};

fn download(url: &str) -> Option<BotCommand> {
    Some(BotCommand::Download { url: url.to_string() })
}

#[test]
fn download_command_takes_first_argument() {
    assert_eq!(parse_command("/download https://a.example/v"), download("https://a.example/v"));
    assert_eq!(
        parse_command("/download   https://a.example/v  extra words"),
        download("https://a.example/v")
    );
    assert_eq!(parse_command("/download\nhttps://a.example/v"), download("https://a.example/v"));
}

#[test]
fn bot_mention_suffix_is_accepted() {
    assert_eq!(parse_command("/download@my_dl_bot https://a.example/v"), download("https://a.example/v"));
    assert_eq!(parse_command("/Download https://a.example/v"), download("https://a.example/v"));
}

#[test]
fn download_without_argument_has_empty_url() {
    assert_eq!(parse_command("/download"), download(""));
    assert_eq!(parse_command("/download   "), download(""));
}

#[test]
fn help_commands() {
    assert_eq!(parse_command("/start"), Some(BotCommand::Help));
    assert_eq!(parse_command("/help@my_dl_bot"), Some(BotCommand::Help));
}

#[test]
fn other_text_is_ignored() {
    assert_eq!(parse_command("hello"), None);
    assert_eq!(parse_command("https://a.example/v"), None);
    assert_eq!(parse_command("/downloadx https://a.example/v"), None);
    assert_eq!(parse_command("/unknown"), None);
    assert_eq!(parse_command(""), None);
}

#[test]
fn chat_kinds_from_api_names() {
    assert_eq!(ChatKind::from_api_str("private"), ChatKind::Private);
    assert_eq!(ChatKind::from_api_str("group"), ChatKind::Group);
    assert_eq!(ChatKind::from_api_str("supergroup"), ChatKind::Group);
    assert_eq!(ChatKind::from_api_str("channel"), ChatKind::Channel);
}
