use clap::Parser;
use schema_forms::cli::{self, Cli};
use schema_forms::config::FormSettings;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = FormSettings::new_with_cli(&cli)?;
    debug!(?settings, "settings loaded");

    let report = cli::run(&cli, &settings)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
