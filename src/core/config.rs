use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which completion backend to talk to. The local backend is an
/// Ollama-compatible server, the hosted backend is an
/// OpenAI-compatible API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Local,
    Hosted,
}

impl Backend {
    fn from_env(var: &str, default: Backend) -> Backend {
        match env::var(var) {
            Ok(value) => match value.as_str() {
                "local" => Backend::Local,
                "hosted" => Backend::Hosted,
                other => panic!("Invalid value '{}' for {}, expected 'local' or 'hosted'", other, var),
            },
            Err(_) => default,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub local_api_hostname: String,
    pub local_model: String,
    pub hosted_api_hostname: String,
    pub hosted_api_key: String,
    pub hosted_model: String,
    pub system_message: String,
    /// Default advisor style when the request doesn't specify one
    pub sentiment: String,
    pub advisor_backend: Backend,
    pub primary_backend: Backend,
    /// Stream replies as SSE fragments instead of returning the whole
    /// reply at once
    pub stream_replies: bool,
    /// Sampling seed used when a request doesn't carry its own
    pub default_seed: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let local_api_hostname = env::var("BACKCHANNEL_LOCAL_LLM_HOST")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());
        let local_model =
            env::var("BACKCHANNEL_LOCAL_LLM_MODEL").unwrap_or_else(|_| "llama3".to_string());
        let hosted_api_hostname = env::var("BACKCHANNEL_HOSTED_API_HOST")
            .unwrap_or_else(|_| "https://api.groq.com/openai".to_string());
        let hosted_api_key =
            env::var("BACKCHANNEL_HOSTED_API_KEY").unwrap_or_else(|_| "thiswontworkforgroq".to_string());
        let hosted_model = env::var("BACKCHANNEL_HOSTED_MODEL")
            .unwrap_or_else(|_| "llama3-8b-8192".to_string());
        let system_message = env::var("BACKCHANNEL_SYSTEM_MESSAGE").unwrap_or_else(|_| {
            "Act as a character of thick skin. Don't be intimidated by childish user \
             behavior and hate speech. Be the better person."
                .to_string()
        });
        let sentiment =
            env::var("BACKCHANNEL_SENTIMENT").unwrap_or_else(|_| "sarcastic".to_string());
        let advisor_backend = Backend::from_env("BACKCHANNEL_ADVISOR_BACKEND", Backend::Hosted);
        let primary_backend = Backend::from_env("BACKCHANNEL_PRIMARY_BACKEND", Backend::Hosted);
        let stream_replies = env::var("BACKCHANNEL_STREAM_REPLIES")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);
        // Seed sampling from the process start time so a server run is
        // reproducible when the request doesn't override it
        let default_seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System clock is before the unix epoch")
            .as_secs() as i64;

        Self {
            local_api_hostname,
            local_model,
            hosted_api_hostname,
            hosted_api_key,
            hosted_model,
            system_message,
            sentiment,
            advisor_backend,
            primary_backend,
            stream_replies,
            default_seed,
        }
    }
}
