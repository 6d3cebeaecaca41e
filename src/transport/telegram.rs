// src/transport/telegram.rs

//! Telegram Bot API transport over HTTPS (`reqwest`).
//!
//! Outbound: `sendMessage`, `editMessageText`, `sendDocument` (multipart,
//! streamed from disk). Inbound: `getUpdates` long polling with offset
//! tracking, exposed as a [`CommandSource`].

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{debug, trace};

use crate::bot::source::{ChatKind, CommandSource, InboundMessage, SourceFuture};
use crate::config::AppConfig;
use crate::errors::TransportError;
use crate::transport::{ChatTransport, TransportFuture};
use crate::types::{ChatId, MessageHandle, MessageId};

/// Hard limit of the API for message text.
pub const MAX_TEXT_CHARS: usize = 4096;
/// Hard limit of the API for media captions.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Per-call timeout for everything except uploads and long polls.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramUpdate {
    pub(crate) update_id: i64,
    #[serde(default)]
    pub(crate) message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramMessage {
    pub(crate) message_id: i64,
    pub(crate) chat: TelegramChat,
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramChat {
    pub(crate) id: i64,
    #[serde(rename = "type")]
    pub(crate) kind: String,
}

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramTransport {
    client: Client,
    base_url: String,
}

// `base_url` embeds the token.
impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

impl TelegramTransport {
    pub fn new(api_url: &str, token: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("dlbot/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, TransportError> {
        Self::new(&cfg.api_url, &cfg.bot_token)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, TransportError> {
        trace!(method, "bot api call");
        let request = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .timeout(timeout.unwrap_or(CALL_TIMEOUT));
        let response: ApiResponse<T> = request.send().await?.json().await?;
        unwrap_response(method, response)
    }

    /// One `getUpdates` round trip.
    pub(crate) async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<TelegramUpdate>, TransportError> {
        let mut body = json!({
            "timeout": poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        // The HTTP request must outlive the server-side long poll.
        self.call("getUpdates", body, Some(poll_timeout + Duration::from_secs(10)))
            .await
    }

    async fn send_document(&self, chat: ChatId, path: &Path, caption: &str) -> Result<(), TransportError> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());

        debug!(chat = %chat, file = %file_name, bytes = len, "uploading document");

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
            .file_name(file_name);
        let form = Form::new()
            .text("chat_id", chat.0.to_string())
            .text("caption", truncate_chars(caption, MAX_CAPTION_CHARS))
            .part("document", part);

        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        unwrap_response("sendDocument", response).map(|_| ())
    }
}

fn unwrap_response<T>(method: &str, response: ApiResponse<T>) -> Result<T, TransportError> {
    match (response.ok, response.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(TransportError::Api {
            method: method.to_string(),
            description: response
                .description
                .unwrap_or_else(|| "no description".to_string()),
        }),
    }
}

/// Cut `s` to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

impl ChatTransport for TelegramTransport {
    fn send_text<'a>(
        &'a self,
        chat: ChatId,
        text: &'a str,
        reply_to: Option<MessageId>,
    ) -> TransportFuture<'a, MessageHandle> {
        Box::pin(async move {
            let mut body = json!({
                "chat_id": chat.0,
                "text": truncate_chars(text, MAX_TEXT_CHARS),
                "disable_web_page_preview": true,
            });
            if let Some(reply) = reply_to {
                body["reply_to_message_id"] = json!(reply.0);
            }
            let message: TelegramMessage = self.call("sendMessage", body, None).await?;
            Ok(MessageHandle {
                chat: ChatId(message.chat.id),
                message_id: MessageId(message.message_id),
            })
        })
    }

    fn edit_text<'a>(&'a self, message: &'a MessageHandle, text: &'a str) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let body = json!({
                "chat_id": message.chat.0,
                "message_id": message.message_id.0,
                "text": truncate_chars(text, MAX_TEXT_CHARS),
                "disable_web_page_preview": true,
            });
            // Result is the edited Message, or `true` for inline messages.
            let _: serde_json::Value = self.call("editMessageText", body, None).await?;
            Ok(())
        })
    }

    fn send_file<'a>(&'a self, chat: ChatId, path: &'a Path, caption: &'a str) -> TransportFuture<'a, ()> {
        Box::pin(self.send_document(chat, path, caption))
    }
}

/// `getUpdates` long-poll loop state.
#[derive(Debug)]
pub struct TelegramUpdates {
    transport: TelegramTransport,
    offset: Option<i64>,
    poll_timeout: Duration,
}

impl TelegramUpdates {
    pub fn new(transport: TelegramTransport, poll_timeout: Duration) -> Self {
        Self {
            transport,
            offset: None,
            poll_timeout,
        }
    }
}

impl CommandSource for TelegramUpdates {
    fn next_batch(&mut self) -> SourceFuture<'_> {
        Box::pin(async move {
            let updates = self.transport.get_updates(self.offset, self.poll_timeout).await?;

            let mut messages = Vec::with_capacity(updates.len());
            for update in updates {
                // Acknowledge everything we have seen, even non-message updates.
                self.offset = Some(update.update_id + 1);

                let Some(message) = update.message else {
                    continue;
                };
                let Some(text) = message.text else {
                    continue;
                };
                messages.push(InboundMessage {
                    chat: ChatId(message.chat.id),
                    chat_kind: ChatKind::from_api_str(&message.chat.kind),
                    message_id: MessageId(message.message_id),
                    text,
                });
            }
            Ok(messages)
        })
    }
}
