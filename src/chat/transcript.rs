use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// The persisted, visible conversation history. Starts with exactly
/// one seed system message and only ever grows by appending user
/// turns and assistant replies that were actually shown to the user.
/// Advisory content never lands here.
#[derive(Clone, Debug, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(system_message: &str) -> Self {
        Transcript {
            messages: vec![Message::new(Role::System, system_message)],
        }
    }

    /// Commit the user's message for the current turn
    pub fn push_user(&mut self, content: &str) {
        self.messages.push(Message::new(Role::User, content));
    }

    /// Commit the assistant's reply for the current turn
    pub fn push_assistant(&mut self, content: &str) {
        self.messages.push(Message::new(Role::Assistant, content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transcript_has_only_the_seed_system_message() {
        let transcript = Transcript::new("You are a helpful assistant.");
        assert_eq!(transcript.len(), 1);
        assert_eq!(
            transcript.messages()[0],
            Message::new(Role::System, "You are a helpful assistant.")
        );
    }

    #[test]
    fn test_appends_preserve_chronological_order() {
        let mut transcript = Transcript::new("seed");
        transcript.push_user("Good morning");
        transcript.push_assistant("Good morning to you too");
        transcript.push_user("How are you?");

        let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(transcript.last().unwrap().content, "How are you?");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(Role::User, "Hello world");
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"role":"user","content":"Hello world"}"#
        );
    }
}
