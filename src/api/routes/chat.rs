//! Router for the chat API

use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    Router,
    extract::{Form, State},
    response::{IntoResponse, Response, sse::Event, sse::KeepAlive, sse::Sse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::api::state::AppState;
use crate::chat::transcript::Message;
use crate::chat::turn::{handle_turn, handle_turn_stream};

type SharedState = Arc<RwLock<AppState>>;

/// Form fields posted by the chat page
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub message: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub seed: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: Vec<Message>,
}

/// Run one chat turn. Streams the reply as SSE when streaming is
/// configured, otherwise responds with the whole reply once it's in.
async fn chat_handler(
    State(state): State<SharedState>,
    Form(form): Form<ChatForm>,
) -> Result<Response, crate::api::public::ApiError> {
    let (transcript, advisor, primary, stream_replies, default_seed, default_sentiment) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (
            Arc::clone(&shared_state.transcript),
            Arc::clone(&shared_state.advisor),
            Arc::clone(&shared_state.primary),
            shared_state.config.stream_replies,
            shared_state.config.default_seed,
            shared_state.config.sentiment.clone(),
        )
    };

    // A blank or unparseable seed falls back to the process default
    let seed = form.seed.trim().parse::<i64>().unwrap_or(default_seed);
    let sentiment = if form.style.trim().is_empty() {
        default_sentiment
    } else {
        form.style.clone()
    };
    let message = form.message;

    if !stream_replies {
        let reply = handle_turn(&transcript, &advisor, &primary, &message, &sentiment, seed).await?;
        return Ok(reply.into_response());
    }

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let sse_stream = UnboundedReceiverStream::new(rx)
        .map(|fragment| Ok::<Event, Infallible>(Event::default().data(fragment)));

    // Run the turn to completion even if the client hangs up so the
    // transcript still gets its commit
    tokio::spawn(async move {
        let result = handle_turn_stream(
            &transcript,
            &advisor,
            &primary,
            tx,
            &message,
            &sentiment,
            seed,
        )
        .await;

        if let Err(e) = result {
            tracing::error!("Chat turn failed: {}", e);
        }
    });

    let resp = Sse::new(sse_stream)
        .keep_alive(
            KeepAlive::default()
                .text("keep-alive")
                .interval(Duration::from_millis(100)),
        )
        .into_response();

    Ok(resp)
}

/// View the persisted transcript
async fn transcript_view(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let transcript = {
        let shared_state = state.read().expect("Unable to read shared state");
        Arc::clone(&shared_state.transcript)
    };
    let transcript = transcript.lock().await.messages().to_vec();

    Ok(axum::Json(TranscriptResponse { transcript }))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/transcript", get(transcript_view))
}
