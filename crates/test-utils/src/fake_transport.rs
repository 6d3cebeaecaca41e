use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use dlbot::errors::TransportError;
use dlbot::transport::{ChatTransport, TransportFuture};
use dlbot::types::{ChatId, MessageHandle, MessageId};

/// One call made against the fake transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Sent {
        chat: ChatId,
        message_id: MessageId,
        text: String,
        reply_to: Option<MessageId>,
    },
    Edited {
        message_id: MessageId,
        text: String,
    },
    /// `contents` is read at upload time, before the handler deletes the file.
    Uploaded {
        chat: ChatId,
        path: PathBuf,
        caption: String,
        contents: Vec<u8>,
    },
}

/// A fake transport that:
/// - records every send, edit and upload in order
/// - hands out increasing message ids
/// - can be told to reject sends, edits or uploads.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    events: Mutex<Vec<Recorded>>,
    next_id: AtomicI64,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
    fail_uploads: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(self) -> Self {
        self.fail_sends.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_edits(self) -> Self {
        self.fail_edits.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_uploads(self) -> Self {
        self.fail_uploads.store(true, Ordering::SeqCst);
        self
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Sent { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn edited_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Edited { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Uploads as `(path, caption, contents)`.
    pub fn uploads(&self) -> Vec<(PathBuf, String, Vec<u8>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Uploaded {
                    path,
                    caption,
                    contents,
                    ..
                } => Some((path, caption, contents)),
                _ => None,
            })
            .collect()
    }

    /// Every text the user could see: sends and edits, in order.
    pub fn visible_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Sent { text, .. } | Recorded::Edited { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Recorded) {
        self.events.lock().unwrap().push(event);
    }

    fn rejected(method: &str) -> TransportError {
        TransportError::Api {
            method: method.to_string(),
            description: "rejected by test transport".to_string(),
        }
    }
}

impl ChatTransport for RecordingTransport {
    fn send_text<'a>(
        &'a self,
        chat: ChatId,
        text: &'a str,
        reply_to: Option<MessageId>,
    ) -> TransportFuture<'a, MessageHandle> {
        Box::pin(async move {
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(Self::rejected("sendMessage"));
            }
            let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            self.record(Recorded::Sent {
                chat,
                message_id,
                text: text.to_string(),
                reply_to,
            });
            Ok(MessageHandle { chat, message_id })
        })
    }

    fn edit_text<'a>(&'a self, message: &'a MessageHandle, text: &'a str) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            if self.fail_edits.load(Ordering::SeqCst) {
                return Err(Self::rejected("editMessageText"));
            }
            self.record(Recorded::Edited {
                message_id: message.message_id,
                text: text.to_string(),
            });
            Ok(())
        })
    }

    fn send_file<'a>(&'a self, chat: ChatId, path: &'a Path, caption: &'a str) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(Self::rejected("sendDocument"));
            }
            let contents = tokio::fs::read(path).await?;
            self.record(Recorded::Uploaded {
                chat,
                path: path.to_path_buf(),
                caption: caption.to_string(),
                contents,
            });
            Ok(())
        })
    }
}
