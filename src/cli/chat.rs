use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::Mutex;

use crate::chat::transcript::Transcript;
use crate::chat::turn::handle_turn;
use crate::core::AppConfig;
use crate::provider;

/// Interactive chat loop against the configured backends. Each line
/// runs one full turn, advisory call included.
pub async fn run() -> Result<()> {
    let mut rl = DefaultEditor::new().expect("Editor failed");

    let config = AppConfig::default();
    let advisor = provider::build(config.advisor_backend, &config);
    let primary = provider::build(config.primary_backend, &config);
    let transcript = Arc::new(Mutex::new(Transcript::new(&config.system_message)));

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let reply = handle_turn(
                    &transcript,
                    &advisor,
                    &primary,
                    line.as_str(),
                    &config.sentiment,
                    config.default_seed,
                )
                .await?;
                println!("{}", reply);
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
