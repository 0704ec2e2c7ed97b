use anyhow::Result;
use backchannel::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
