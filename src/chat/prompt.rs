//! The advisor prompt, templated with Handlebars. Handlebars adds a
//! layer of safety since the sentiment value comes straight from the
//! request form and can't do anything without registered helpers.

use anyhow::Result;
use handlebars::Handlebars;
use serde_json::json;

const ADVISOR_PROMPT: &str = r#"
You are the private thought process of the assistant.
Your job is to give the assistant agent advice on how to make the conversation engaging and {{sentiment}}.
Keep it short and simple.

Example 1:
    "User message: The user is rude, greeting the agent in a degrading way.
    Advice to assistant agent: Try to de-escalate by greeting back in a {{sentiment}} way."

Example 2:
    "User message: The sense of the message is dull, a mundane hello and nothing else.
    Advice to assistant agent: Make it interesting, in a {{sentiment}} way."

Always tell the assistant agent that it is advised to act in a {{sentiment}} way, otherwise
it may mistake the advice for a comment.

Avoid:
    "Good morning to you too."

Instead:
    "Advice to assistant agent: Greet back in a {{sentiment}} way. For example: 'Good morning to you too.'"
"#;

/// Render the advisory system prompt for the given sentiment, a short
/// style descriptor like "sarcastic" supplied by the caller.
pub fn advisor_prompt(sentiment: &str) -> Result<String> {
    let handlebars = Handlebars::new();
    let rendered = handlebars.render_template(ADVISOR_PROMPT, &json!({"sentiment": sentiment}))?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisor_prompt_carries_the_sentiment() {
        let prompt = advisor_prompt("sarcastic").unwrap();
        assert!(prompt.contains("engaging and sarcastic"));
        assert!(prompt.contains("advised to act in a sarcastic way"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_advisor_prompt_coaches_rather_than_replies() {
        let prompt = advisor_prompt("playful").unwrap();
        assert!(prompt.contains("Advice to assistant agent"));
        assert!(prompt.contains("thought process of the assistant"));
    }
}
