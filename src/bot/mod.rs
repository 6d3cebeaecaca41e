// src/bot/mod.rs

//! Inbound side of the bot: message sources, command parsing and the
//! dispatcher that turns commands into request tasks.

pub mod commands;
pub mod dispatcher;
pub mod source;

pub use commands::{BotCommand, parse_command};
pub use dispatcher::Dispatcher;
pub use source::{ChatKind, CommandSource, InboundMessage, SourceFuture};
