use std::sync::Arc;

use anyhow::anyhow;

use super::ChatError;
use super::prompt::advisor_prompt;
use super::transcript::{Message, Role};
use crate::provider::CompletionProvider;

/// Marker prefix on the quoted user message so the advisor model can
/// tell it apart from its own instructions.
const USER_MESSAGE_MARKER: &str = "User message: ";

/// Ask the advisor model how the assistant should respond to the
/// user's message. The result is free-text coaching for the primary
/// completion, never a direct reply to the user, and it is never
/// shown to the user or persisted.
pub async fn request_advice(
    provider: &Arc<dyn CompletionProvider>,
    user_message: &str,
    sentiment: &str,
    seed: i64,
) -> Result<String, ChatError> {
    let system_prompt = advisor_prompt(sentiment).map_err(ChatError::Advisory)?;

    let messages = vec![
        Message::new(Role::System, &system_prompt),
        Message::new(
            Role::User,
            &format!("{}{}", USER_MESSAGE_MARKER, user_message),
        ),
    ];

    let advice = provider
        .complete(&messages, seed)
        .await
        .map_err(|e| ChatError::Advisory(e.into()))?;

    if advice.trim().is_empty() {
        return Err(ChatError::Advisory(anyhow!(
            "Advisor returned an empty completion"
        )));
    }

    Ok(advice)
}
