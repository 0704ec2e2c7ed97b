//! Completion backends. Both the advisory and the primary completion
//! go through the `CompletionProvider` capability so callers never
//! branch on which server they're talking to.

pub mod hosted;
pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::chat::transcript::Message;
use crate::core::{AppConfig, Backend};

pub use hosted::HostedProvider;
pub use local::LocalProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// A chat completion backend. Implementations own their wire format
/// and model configuration; callers only hand over the message
/// sequence and a sampling seed.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Single request/response completion. Returns the full text of
    /// the top completion choice.
    async fn complete(&self, messages: &[Message], seed: i64) -> Result<String, ProviderError>;

    /// Streaming completion. Cleaned reply fragments are sent on `tx`
    /// as they arrive and the accumulated reply is returned once the
    /// provider signals completion.
    async fn complete_stream(
        &self,
        tx: mpsc::UnboundedSender<String>,
        messages: &[Message],
        seed: i64,
    ) -> Result<String, ProviderError>;
}

/// Build a provider for the configured backend.
pub fn build(backend: Backend, config: &AppConfig) -> Arc<dyn CompletionProvider> {
    match backend {
        Backend::Local => Arc::new(LocalProvider::new(
            &config.local_api_hostname,
            &config.local_model,
        )),
        Backend::Hosted => Arc::new(HostedProvider::new(
            &config.hosted_api_hostname,
            &config.hosted_api_key,
            &config.hosted_model,
        )),
    }
}
