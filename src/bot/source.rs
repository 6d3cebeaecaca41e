// src/bot/source.rs

//! Inbound message source abstraction.
//!
//! The dispatcher pulls batches of messages from a `CommandSource`.
//! Production uses the Bot API long poll
//! ([`TelegramUpdates`](crate::transport::TelegramUpdates)); tests feed a
//! scripted source.

use std::future::Future;
use std::pin::Pin;

use crate::errors::TransportError;
use crate::types::{ChatId, MessageId};

/// Kind of chat a message was sent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Channel,
}

impl ChatKind {
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "private" => ChatKind::Private,
            "channel" => ChatKind::Channel,
            _ => ChatKind::Group,
        }
    }
}

/// A text message received by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat: ChatId,
    pub chat_kind: ChatKind,
    pub message_id: MessageId,
    pub text: String,
}

pub type SourceFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<InboundMessage>, TransportError>> + Send + 'a>>;

pub trait CommandSource: Send {
    /// Wait for the next batch of messages. An empty batch is normal
    /// (e.g. a long poll that timed out).
    fn next_batch(&mut self) -> SourceFuture<'_>;
}
