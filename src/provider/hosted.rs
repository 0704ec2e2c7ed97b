use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use super::{CompletionProvider, ProviderError};
use crate::chat::transcript::Message;

/// Client for a hosted OpenAI-compatible completion API.
pub struct HostedProvider {
    hostname: String,
    api_key: String,
    model: String,
}

impl HostedProvider {
    pub fn new(hostname: &str, api_key: &str, model: &str) -> Self {
        HostedProvider {
            hostname: hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.hostname.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for HostedProvider {
    async fn complete(&self, messages: &[Message], seed: i64) -> Result<String, ProviderError> {
        let payload = json!({
            "model": self.model,
            "messages": messages,
            "seed": seed,
        });

        let response = reqwest::Client::new()
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::MalformedResponse(format!(
                    "missing choices[0].message.content in: {}",
                    body
                ))
            })
    }

    async fn complete_stream(
        &self,
        tx: mpsc::UnboundedSender<String>,
        messages: &[Message],
        seed: i64,
    ) -> Result<String, ProviderError> {
        // The hosted API is only used non-streaming in this design, so
        // deliver the whole reply as a single fragment. Streaming mode
        // then works no matter which backend is configured.
        let reply = self.complete(messages, seed).await?;
        let _ = tx.send(reply.clone());
        Ok(reply)
    }
}
