use std::sync::Arc;

use tokio::sync::Mutex;

use crate::chat::transcript::Transcript;
use crate::core::AppConfig;
use crate::provider::{self, CompletionProvider};

pub struct AppState {
    /// Locked for the whole of a turn, begin through commit, so
    /// overlapping requests can't interleave transcript writes
    pub transcript: Arc<Mutex<Transcript>>,
    pub advisor: Arc<dyn CompletionProvider>,
    pub primary: Arc<dyn CompletionProvider>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let transcript = Arc::new(Mutex::new(Transcript::new(&config.system_message)));
        let advisor = provider::build(config.advisor_backend, &config);
        let primary = provider::build(config.primary_backend, &config);
        Self {
            transcript,
            advisor,
            primary,
            config,
        }
    }
}
