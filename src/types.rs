// src/types.rs

use std::fmt;
use std::path::PathBuf;

use uuid::Uuid;

/// Identifier of a chat on the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message, unique within its chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

/// Handle to a single editable message (the live status message of a request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub chat: ChatId,
    pub message_id: MessageId,
}

/// One download command as received from a chat.
///
/// Immutable once built; owned by exactly one request handler invocation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Per-request identifier, also used to isolate the request's files.
    pub id: Uuid,
    /// Raw URL argument. May be empty; validation happens in the handler.
    pub url: String,
    pub chat: ChatId,
    /// The command message, if the status message should reply to it.
    pub reply_to: Option<MessageId>,
    /// Cookie file for both engine invocations. The dispatcher fills it from
    /// config; nothing downstream consults config for it again.
    pub cookie_file: Option<PathBuf>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, chat: ChatId) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            chat,
            reply_to: None,
            cookie_file: None,
        }
    }

    pub fn with_reply_to(mut self, message: MessageId) -> Self {
        self.reply_to = Some(message);
        self
    }

    pub fn with_cookie_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_file = path;
        self
    }
}
