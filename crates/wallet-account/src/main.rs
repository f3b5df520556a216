use std::path::PathBuf;

use clap::Parser;
use wallet_account::config::Config;
use wallet_account::dispatcher::Dispatcher;
use wallet_account::logging::init_logging;
use wallet_account::registry::ChainRegistry;
use wallet_account::server::AccountServer;

const EXIT_ERROR: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "wallet-account", version, about = "Multi-chain account and transaction gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short = 'c', long = "config", default_value = "config.toml")]
    config: PathBuf,
}

async fn serve(config: Config) -> Result<(), String> {
    let registry = ChainRegistry::from_config(&config).map_err(|e| e.to_string())?;
    let dispatcher = Dispatcher::new(registry);

    let server = AccountServer::bind(&config.listen_addr(), dispatcher)
        .await
        .map_err(|e| e.to_string())?;

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await
        .map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };

    if let Err(e) = init_logging(&config.log) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(EXIT_ERROR);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };

    if let Err(e) = rt.block_on(serve(config)) {
        tracing::error!(error = %e, "wallet account service stopped");
        eprintln!("Error: {e}");
        std::process::exit(EXIT_ERROR);
    }
}
