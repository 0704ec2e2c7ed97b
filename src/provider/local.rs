use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{CompletionProvider, ProviderError};
use crate::chat::transcript::Message;

/// Client for an Ollama-compatible chat server. Supports both a
/// single request/response completion and streaming line-delimited
/// JSON chunks.
pub struct LocalProvider {
    hostname: String,
    model: String,
}

#[derive(Serialize)]
struct LocalRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: LocalOptions,
}

#[derive(Serialize)]
struct LocalOptions {
    seed: i64,
}

/// One message from the local server. The same shape is used for the
/// whole non-streaming response body and for each streamed line.
#[derive(Deserialize)]
struct LocalChunk {
    message: LocalChunkMessage,
    done: bool,
}

#[derive(Deserialize)]
struct LocalChunkMessage {
    #[serde(default)]
    content: String,
}

/// Strips one enclosing layer of quote characters, a formatting
/// artifact of the local server's streamed fragments.
fn strip_quote_layer(fragment: &str) -> &str {
    let fragment = fragment.strip_prefix('"').unwrap_or(fragment);
    fragment.strip_suffix('"').unwrap_or(fragment)
}

impl LocalProvider {
    pub fn new(hostname: &str, model: &str) -> Self {
        LocalProvider {
            hostname: hostname.to_string(),
            model: model.to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.hostname.trim_end_matches('/'))
    }

    async fn send_request(
        &self,
        messages: &[Message],
        seed: i64,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let payload = LocalRequest {
            model: &self.model,
            messages,
            stream,
            options: LocalOptions { seed },
        };
        let response = reqwest::Client::new()
            .post(self.chat_url())
            .timeout(Duration::from_secs(60 * 10))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Parse one streamed line, forward the cleaned fragment, and grow
/// the running reply. Returns whether the server flagged the stream
/// as done; the done flag is honored even when the fragment on the
/// same line is empty.
fn process_line(
    tx: &mpsc::UnboundedSender<String>,
    line: &str,
    reply: &mut String,
) -> Result<bool, ProviderError> {
    let chunk = serde_json::from_str::<LocalChunk>(line)
        .map_err(|e| ProviderError::MalformedResponse(format!("{} in line: {}", e, line)))?;

    let fragment = strip_quote_layer(&chunk.message.content);
    if !fragment.is_empty() {
        reply.push_str(fragment);
        // The receiver may have hung up early; keep consuming anyway
        // so the reply can still be committed.
        let _ = tx.send(fragment.to_string());
    }

    Ok(chunk.done)
}

#[async_trait]
impl CompletionProvider for LocalProvider {
    async fn complete(&self, messages: &[Message], seed: i64) -> Result<String, ProviderError> {
        let response = self.send_request(messages, seed, false).await?;
        let chunk = response
            .json::<LocalChunk>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        Ok(chunk.message.content)
    }

    async fn complete_stream(
        &self,
        tx: mpsc::UnboundedSender<String>,
        messages: &[Message],
        seed: i64,
    ) -> Result<String, ProviderError> {
        let response = self.send_request(messages, seed, true).await?;
        let mut stream = response.bytes_stream();

        let mut reply = String::new();
        let mut buffer = String::new();
        let mut done = false;

        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let chunk_str = std::str::from_utf8(&chunk)
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

            // Lines can fragment across network reads so buffer until
            // a complete line is available
            buffer.push_str(chunk_str);
            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer = buffer[line_end + 1..].to_string();
                if line.is_empty() {
                    continue;
                }
                if process_line(&tx, &line, &mut reply)? {
                    done = true;
                    break 'outer;
                }
            }
        }

        // A final line without a trailing newline still counts
        if !done {
            let line = buffer.trim();
            if !line.is_empty() {
                done = process_line(&tx, line, &mut reply)?;
            }
        }

        if !done {
            return Err(ProviderError::MalformedResponse(
                "stream ended before the done flag".to_string(),
            ));
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::transcript::Role;

    #[test]
    fn test_strip_quote_layer_removes_one_layer_only() {
        assert_eq!(strip_quote_layer(r#""Hello""#), "Hello");
        assert_eq!(strip_quote_layer(r#"""Hello"""#), r#""Hello""#);
        assert_eq!(strip_quote_layer("Hello"), "Hello");
        assert_eq!(strip_quote_layer(r#""Hel"#), "Hel");
        assert_eq!(strip_quote_layer(r#"lo""#), "lo");
        assert_eq!(strip_quote_layer(r#"""#), "");
        assert_eq!(strip_quote_layer(""), "");
    }

    #[tokio::test]
    async fn test_complete_returns_the_message_content() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":{"role":"assistant","content":"Hello!"},"done":true}"#)
            .create_async()
            .await;

        let provider = LocalProvider::new(&server.url(), "llama3");
        let messages = vec![Message::new(Role::User, "Hi")];
        let reply = provider.complete(&messages, 42).await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_complete_maps_server_errors_to_status() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body("model not loaded")
            .create_async()
            .await;

        let provider = LocalProvider::new(&server.url(), "llama3");
        let messages = vec![Message::new(Role::User, "Hi")];
        let result = provider.complete(&messages, 42).await;

        match result {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "model not loaded");
            }
            other => panic!("Expected a status error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_complete_stream_yields_fragments_and_accumulates() {
        let mut server = mockito::Server::new_async().await;

        let ndjson = concat!(
            "{\"message\":{\"content\":\"\\\"Hel\\\"\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"lo\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"\"},\"done\":true}\n",
        );

        let mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/x-ndjson")
            .with_body(ndjson)
            .create_async()
            .await;

        let provider = LocalProvider::new(&server.url(), "llama3");
        let messages = vec![Message::new(Role::User, "Say hello")];
        let (tx, mut rx) = mpsc::unbounded_channel();

        let reply = provider.complete_stream(tx, &messages, 42).await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Hello");

        // Empty fragments are suppressed from the channel
        let mut fragments = Vec::new();
        while let Ok(fragment) = rx.try_recv() {
            fragments.push(fragment);
        }
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_complete_stream_without_done_flag_is_malformed() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("{\"message\":{\"content\":\"Hel\"},\"done\":false}\n")
            .create_async()
            .await;

        let provider = LocalProvider::new(&server.url(), "llama3");
        let messages = vec![Message::new(Role::User, "Hi")];
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = provider.complete_stream(tx, &messages, 42).await;
        assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_complete_stream_handles_missing_trailing_newline() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("{\"message\":{\"content\":\"Hi\"},\"done\":true}")
            .create_async()
            .await;

        let provider = LocalProvider::new(&server.url(), "llama3");
        let messages = vec![Message::new(Role::User, "Hi")];
        let (tx, _rx) = mpsc::unbounded_channel();

        let reply = provider.complete_stream(tx, &messages, 42).await.unwrap();
        assert_eq!(reply, "Hi");
    }
}
