use std::sync::{Arc, RwLock};

use axum::Router;
use axum::body::Body;
use backchannel::api::{AppState, app};
use backchannel::core::{AppConfig, Backend};

/// Builds the app with both backends pointed at a mock server. The
/// streaming variant talks to the local-style endpoint, the
/// non-streaming one to the hosted-style endpoint.
pub fn test_app(provider_url: &str, stream_replies: bool) -> Router {
    let config = AppConfig {
        local_api_hostname: provider_url.to_string(),
        local_model: "llama3".to_string(),
        hosted_api_hostname: provider_url.to_string(),
        hosted_api_key: "test-key".to_string(),
        hosted_model: "llama3-8b-8192".to_string(),
        system_message: "Act as a character of thick skin.".to_string(),
        sentiment: "sarcastic".to_string(),
        advisor_backend: Backend::Hosted,
        primary_backend: if stream_replies {
            Backend::Local
        } else {
            Backend::Hosted
        },
        stream_replies,
        default_seed: 42,
    };

    let app_state = AppState::new(config);
    let shared_state = Arc::new(RwLock::new(app_state));
    app(shared_state)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not utf-8")
}
