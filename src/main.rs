use anyhow::Result;
use clap::Parser;
use stats_backfill::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("Run completed successfully"),
        Err(e) => tracing::error!(error = %e, "Run exited with error"),
    }
    result
}
