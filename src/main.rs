use anyhow::Result;
use clap::Parser;

use accident_notify::config::AppConfig;
use accident_notify::tracing as app_tracing;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    if !cli.needs_config() {
        return cli.run_offline();
    }

    let config = AppConfig::load_with(&cli.overrides())?;
    let _telemetry = app_tracing::init_tracing(&config)?;

    tracing::info!(
        environment = %config.environment,
        api = %config.api.base_url,
        "Configuration loaded and tracing initialized"
    );

    cli.run(config).await
}
