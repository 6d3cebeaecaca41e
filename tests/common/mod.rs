#![allow(dead_code)]

use std::sync::Arc;

use dlbot::context::AppContext;
use dlbot::types::{ChatId, DownloadRequest, MessageId};
use dlbot_test_utils::{AppConfigBuilder, RecordingTransport, test_context};

pub use dlbot_test_utils::{init_tracing, with_timeout};

pub const CHAT: ChatId = ChatId(4242);
pub const COMMAND_MESSAGE: MessageId = MessageId(7);

pub fn request(url: &str) -> DownloadRequest {
    DownloadRequest::new(url, CHAT).with_reply_to(COMMAND_MESSAGE)
}

/// Context whose downloads land under `download_dir`, run by `engine`.
pub fn context(
    builder: AppConfigBuilder,
    transport: &Arc<RecordingTransport>,
) -> AppContext {
    test_context(builder.build(), Arc::clone(transport))
}

/// Number of entries left in a directory (0 if it does not exist).
pub fn entries_in(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}
