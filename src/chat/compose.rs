use super::transcript::{Message, Role, Transcript};

/// Builds the ephemeral message sequence for a single completion
/// call: the persisted transcript, then the advice as a user turn
/// (when there is any), then the real user message. The transcript
/// itself is untouched; committing the user message is a separate,
/// explicit step that happens exactly once per turn.
pub fn compose(transcript: &Transcript, advice: &str, user_message: &str) -> Vec<Message> {
    let mut ephemeral = transcript.messages().to_vec();
    if !advice.trim().is_empty() {
        ephemeral.push(Message::new(Role::User, advice));
    }
    ephemeral.push(Message::new(Role::User, user_message));
    ephemeral
}
