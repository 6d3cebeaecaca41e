// tests/telegram_transport.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use dlbot::bot::{ChatKind, CommandSource};
use dlbot::errors::TransportError;
use dlbot::transport::telegram::{MAX_TEXT_CHARS, truncate_chars};
use dlbot::transport::{ChatTransport, TelegramTransport, TelegramUpdates};
use dlbot::types::{ChatId, MessageHandle, MessageId};

type TestResult = Result<(), Box<dyn Error>>;

/// One request seen by the stub: `(path, json body)`.
type Seen = Arc<Mutex<Vec<(String, Value)>>>;

/// Minimal Bot API stand-in: answers each connection with the next canned
/// JSON document and records what was asked.
async fn stub_api(responses: Vec<Value>) -> std::io::Result<(String, Seen)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    let seen: Seen = Arc::default();
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        for response in responses {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let mut reader = BufReader::new(socket);

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).await.is_err() {
                return;
            }
            let path = request_line.split_whitespace().nth(1).unwrap_or("").to_string();

            let mut content_length = 0usize;
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).await.is_err() {
                    return;
                }
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            if reader.read_exact(&mut body).await.is_err() {
                return;
            }
            let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
            log.lock().unwrap().push((path, body));

            let payload = response.to_string();
            let reply = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                payload.len(),
                payload
            );
            let mut socket = reader.into_inner();
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Ok((url, seen))
}

#[tokio::test]
async fn send_and_edit_use_bot_api_methods() -> TestResult {
    init_tracing();
    let (url, seen) = stub_api(vec![
        json!({"ok": true, "result": {"message_id": 55, "chat": {"id": 9, "type": "private"}, "text": "hi"}}),
        json!({"ok": true, "result": true}),
    ])
    .await?;
    let transport = TelegramTransport::new(&url, "123:ABC")?;

    let handle = with_timeout(transport.send_text(ChatId(9), "hi", Some(MessageId(3)))).await?;
    assert_eq!(handle, MessageHandle { chat: ChatId(9), message_id: MessageId(55) });
    with_timeout(transport.edit_text(&handle, "edited")).await?;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[0].0, "/bot123:ABC/sendMessage");
    assert_eq!(seen[0].1["chat_id"], json!(9));
    assert_eq!(seen[0].1["reply_to_message_id"], json!(3));
    assert_eq!(seen[1].0, "/bot123:ABC/editMessageText");
    assert_eq!(seen[1].1["message_id"], json!(55));
    assert_eq!(seen[1].1["text"], json!("edited"));
    Ok(())
}

#[tokio::test]
async fn api_errors_carry_the_description() -> TestResult {
    init_tracing();
    let (url, _seen) = stub_api(vec![json!({
        "ok": false,
        "error_code": 400,
        "description": "Bad Request: message is not modified"
    })])
    .await?;
    let transport = TelegramTransport::new(&url, "123:ABC")?;
    let handle = MessageHandle { chat: ChatId(1), message_id: MessageId(2) };

    match with_timeout(transport.edit_text(&handle, "same")).await {
        Err(TransportError::Api { method, description }) => {
            assert_eq!(method, "editMessageText");
            assert!(description.contains("not modified"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn updates_advance_the_offset_and_keep_text_messages_only() -> TestResult {
    init_tracing();
    let (url, seen) = stub_api(vec![
        json!({"ok": true, "result": [
            {"update_id": 100, "message": {"message_id": 1, "chat": {"id": 5, "type": "private"}, "text": "/download https://x.example/v"}},
            {"update_id": 101, "message": {"message_id": 2, "chat": {"id": -7, "type": "supergroup"}, "text": "hello"}},
            {"update_id": 102, "message": {"message_id": 3, "chat": {"id": 5, "type": "private"}}},
            {"update_id": 103, "edited_message": {"message_id": 1, "chat": {"id": 5, "type": "private"}, "text": "x"}}
        ]}),
        json!({"ok": true, "result": []}),
    ])
    .await?;
    let transport = TelegramTransport::new(&url, "123:ABC")?;
    let mut updates = TelegramUpdates::new(transport, Duration::from_secs(0));

    let batch = with_timeout(updates.next_batch()).await?;
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].chat, ChatId(5));
    assert_eq!(batch[0].chat_kind, ChatKind::Private);
    assert_eq!(batch[0].message_id, MessageId(1));
    assert_eq!(batch[0].text, "/download https://x.example/v");
    assert_eq!(batch[1].chat_kind, ChatKind::Group);

    let batch = with_timeout(updates.next_batch()).await?;
    assert!(batch.is_empty());

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[0].0, "/bot123:ABC/getUpdates");
    assert!(seen[0].1.get("offset").is_none());
    assert_eq!(seen[1].1["offset"], json!(104));
    Ok(())
}

#[test]
fn truncation_counts_characters() {
    assert_eq!(truncate_chars("héllo", 2), "hé");
    assert_eq!(truncate_chars("short", 10), "short");
    let long = "é".repeat(MAX_TEXT_CHARS + 10);
    assert_eq!(truncate_chars(&long, MAX_TEXT_CHARS).chars().count(), MAX_TEXT_CHARS);
}

#[test]
fn debug_output_hides_the_token() -> TestResult {
    let transport = TelegramTransport::new("https://api.telegram.org", "123:SECRET")?;
    assert!(!format!("{transport:?}").contains("SECRET"));
    Ok(())
}
