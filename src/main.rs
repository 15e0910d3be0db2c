use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use posta::config::{Config, LogConfig, LogFormat};
use posta::{AppContext, Server, app};

#[derive(Parser)]
#[command(name = "posta")]
#[command(about = "In-memory posts API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides `server.addr`.
    #[arg(short, long)]
    addr: Option<String>,
}

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&log.level));
    let compact = log.format == LogFormat::Compact;

    tracing_subscriber::registry()
        .with(filter)
        .with((!compact).then(|| tracing_subscriber::fmt::layer()))
        .with(compact.then(|| tracing_subscriber::fmt::layer().compact()))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(addr) = cli.addr {
        config.server.addr = addr;
    }

    init_logging(&config.log);

    tracing::info!(
        addr = %config.server.addr,
        delete_policy = ?config.store.delete_policy,
        "configuration loaded"
    );

    let dispatcher = app::dispatcher(AppContext::new(config.store.delete_policy));

    Server::bind(&config.server.addr)?
        .drain_timeout(config.server.drain_timeout())
        .serve(dispatcher)
        .await?;

    Ok(())
}
