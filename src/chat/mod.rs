//! Two-stage chat orchestration. A hidden advisory completion
//! produces coaching text that rides along as ephemeral context into
//! the user-facing completion, while the persisted transcript only
//! ever records what the user actually sees.

pub mod advisor;
pub mod compose;
pub mod prompt;
pub mod transcript;
pub mod turn;

use thiserror::Error;

use crate::provider::ProviderError;

pub use compose::compose;
pub use transcript::{Message, Role, Transcript};
pub use turn::{handle_turn, handle_turn_stream};

#[derive(Debug, Error)]
pub enum ChatError {
    /// The hidden advice call failed. Recoverable: callers degrade to
    /// empty advice instead of aborting the turn.
    #[error("advisory completion failed: {0}")]
    Advisory(anyhow::Error),
    /// The user-facing completion failed. The turn is aborted and no
    /// assistant message is committed to the transcript.
    #[error("primary completion failed: {0}")]
    Completion(#[source] ProviderError),
}
