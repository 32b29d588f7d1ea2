use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use emission_zk_prover::{ServiceConfig, read_service_config};
use emission_zk_server::{Wiring, build_service, setup_logger};

#[derive(Parser)]
#[command(name = "emission-prover")]
#[command(about = "Prove that on-chain storage slots hold the expected emission")]
struct Cli {
    /// Path to the TOML service config, defaults apply when omitted
    #[arg(short, long, env = "EMISSION_PROVER_CONFIG")]
    config: Option<PathBuf>,
    /// Port to listen on, takes precedence over the config and the PORT variable
    #[arg(short, long)]
    port: Option<u16>,
    /// Serve with in-process collaborators instead of a real backend and proof network
    ///
    /// Requires the `dev` feature. Nothing is read from or written to any chain.
    #[arg(long)]
    dev: bool,
    /// Storage slot values served in dev mode
    ///
    /// Comma separated, e.g. "10000,10000,10000"
    #[arg(long, value_delimiter = ',', requires = "dev")]
    dev_slots: Vec<u64>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    setup_logger()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_service_config(path)?,
        None => ServiceConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::info!(?config, "starting emission prover");

    let wiring = if cli.dev {
        Wiring::Dev(cli.dev_slots)
    } else {
        Wiring::Unconfigured
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let service = Arc::new(build_service(config, wiring)?);

    let (_, server) = emission_zk_server::serve(service, addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutting down");
    })?;
    server.await?;

    Ok(())
}
