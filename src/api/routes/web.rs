//! The chat page, rendered server side with Handlebars.

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::State,
    response::Html,
    routing::get,
};
use handlebars::Handlebars;
use serde_json::json;

use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

const CHAT_PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Backchannel</title>
  </head>
  <body>
    <h1>Chat with an advised character</h1>
    <form method="post" action="/api/chat">
      <label for="message">Message</label>
      <input type="text" id="message" name="message" required>
      <label for="style">Style</label>
      <input type="text" id="style" name="style" value="{{default_style}}">
      <label for="seed">Seed</label>
      <input type="text" id="seed" name="seed" placeholder="random">
      <button type="submit">Send</button>
    </form>
    <p><a href="/api/chat/transcript">View transcript</a></p>
  </body>
</html>
"#;

async fn chat_page(
    State(state): State<SharedState>,
) -> Result<Html<String>, crate::api::public::ApiError> {
    let default_style = {
        let shared_state = state.read().expect("Unable to read shared state");
        shared_state.config.sentiment.clone()
    };

    let handlebars = Handlebars::new();
    let page = handlebars.render_template(CHAT_PAGE, &json!({"default_style": default_style}))?;
    Ok(Html(page))
}

/// Create the web page router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(chat_page))
}
