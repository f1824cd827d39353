use anyhow::Result;
use clap::Parser;

use backend_bootstrap::logging::{init_logging, LoggingOptions};
use backend_infrastructure::CONFIG_ENV;

#[derive(Parser, Debug)]
#[command(name = "fraudlens-backend")]
#[command(about = "Fraudlens prediction and dashboard server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging(&LoggingOptions::from_env(), "fraudlens-backend")?;

    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var(CONFIG_ENV, config);
    }

    backend_bootstrap::run_standalone().await
}
