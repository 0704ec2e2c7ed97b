use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use super::ChatError;
use super::advisor::request_advice;
use super::compose::compose;
use super::transcript::Transcript;
use crate::provider::CompletionProvider;

/// Runs one non-streaming turn: a hidden advisory completion, then
/// the user-facing completion over the advice-augmented ephemeral
/// sequence. The transcript lock is held from begin-turn through
/// commit so concurrent turns over the same transcript serialize.
pub async fn handle_turn(
    transcript: &Mutex<Transcript>,
    advisor: &Arc<dyn CompletionProvider>,
    primary: &Arc<dyn CompletionProvider>,
    user_message: &str,
    sentiment: &str,
    seed: i64,
) -> Result<String, ChatError> {
    let mut transcript = transcript.lock().await;

    let advice = advice_or_empty(advisor, user_message, sentiment, seed).await;
    let ephemeral = compose(&transcript, &advice, user_message);

    // The visible user turn is committed no matter how the primary
    // call goes; only the assistant reply is gated on success
    transcript.push_user(user_message);

    let reply = primary
        .complete(&ephemeral, seed)
        .await
        .map_err(ChatError::Completion)?;
    transcript.push_assistant(&reply);

    Ok(reply)
}

/// Streaming variant of [`handle_turn`]. Reply fragments are sent on
/// `tx` as the provider produces them; once the provider signals
/// completion the accumulated reply is committed to the transcript
/// exactly once. An interrupted stream never commits a partial reply.
pub async fn handle_turn_stream(
    transcript: &Mutex<Transcript>,
    advisor: &Arc<dyn CompletionProvider>,
    primary: &Arc<dyn CompletionProvider>,
    tx: mpsc::UnboundedSender<String>,
    user_message: &str,
    sentiment: &str,
    seed: i64,
) -> Result<String, ChatError> {
    let mut transcript = transcript.lock().await;

    let advice = advice_or_empty(advisor, user_message, sentiment, seed).await;
    let ephemeral = compose(&transcript, &advice, user_message);

    transcript.push_user(user_message);

    let reply = primary
        .complete_stream(tx, &ephemeral, seed)
        .await
        .map_err(ChatError::Completion)?;
    transcript.push_assistant(&reply);

    Ok(reply)
}

/// A failed advisory call degrades to no advice instead of aborting
/// the user-facing turn.
async fn advice_or_empty(
    advisor: &Arc<dyn CompletionProvider>,
    user_message: &str,
    sentiment: &str,
    seed: i64,
) -> String {
    match request_advice(advisor, user_message, sentiment, seed).await {
        Ok(advice) => advice,
        Err(e) => {
            tracing::warn!("Advisory completion failed, continuing without advice: {}", e);
            String::new()
        }
    }
}
