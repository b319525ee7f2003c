use anyhow::Context;
use clap::Parser;
use collabviz::{AppConfig, AppState, Dataset, HttpServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "collabviz", version, about = "Team collaboration metric dashboards")]
struct Cli {
    /// YAML configuration file; built-in dashboards when omitted
    #[arg(long, env = "COLLABVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// CSV dataset, overrides the configured path
    #[arg(long, env = "COLLABVIZ_DATA")]
    data: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    address: Option<String>,

    /// Listening port
    #[arg(long, env = "COLLABVIZ_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    info!("Collabviz v{}", collabviz::version());

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(data) = cli.data {
        config.data.path = data;
    }
    if let Some(address) = cli.address {
        config.server.address = address;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate().context("validating configuration")?;

    let dataset = Dataset::load_csv(&config.data.path)
        .with_context(|| format!("loading dataset from {}", config.data.path.display()))?;
    let state = AppState::from_config(&config, Arc::new(dataset))
        .context("building dashboards")?;

    HttpServer::new(Arc::new(state), config.server.clone())
        .start()
        .await
        .context("serving dashboards")?;
    Ok(())
}
