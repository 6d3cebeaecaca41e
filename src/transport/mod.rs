// src/transport/mod.rs

//! Chat transport abstraction.
//!
//! The request pipeline talks to a `ChatTransport` instead of a concrete
//! messaging client. Production uses [`telegram::TelegramTransport`]; tests
//! provide a recording fake.
//!
//! Every call may fail with a [`TransportError`]. Callers in the reporting
//! path log and swallow those; only a failed upload is surfaced to the user.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::errors::TransportError;
use crate::types::{ChatId, MessageHandle, MessageId};

pub mod telegram;

pub use telegram::{TelegramTransport, TelegramUpdates};

/// Boxed future returned by transport calls.
pub type TransportFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// Outbound primitives the request handler needs.
pub trait ChatTransport: Send + Sync {
    /// Send a text message, optionally as a reply, and return its handle.
    fn send_text<'a>(
        &'a self,
        chat: ChatId,
        text: &'a str,
        reply_to: Option<MessageId>,
    ) -> TransportFuture<'a, MessageHandle>;

    /// Replace the text of an existing message.
    fn edit_text<'a>(&'a self, message: &'a MessageHandle, text: &'a str) -> TransportFuture<'a, ()>;

    /// Upload a local file as a document with a caption.
    fn send_file<'a>(&'a self, chat: ChatId, path: &'a Path, caption: &'a str) -> TransportFuture<'a, ()>;
}
