//! # Story Card CLI
//!
//! Replays an editing script and exports the card.

use clap::Parser;
use storycard_cli::{CliArgs, CliConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "storycard=debug,storycard_cli=debug,storycard_core=debug,storycard_renderer=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = CliConfig::from(args);

    tracing::info!(
        "Replaying {} into {}",
        config.script.display(),
        config.output.display()
    );

    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(storycard_cli::run(&config))?;

    tracing::info!(
        "Replayed {} steps, wrote {} image(s)",
        summary.steps,
        summary.outputs.len()
    );
    Ok(())
}
