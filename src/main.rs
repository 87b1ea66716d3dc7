use std::env;
use hawkular_datasource::{api, config::ServerConfig, logging, metrics, ExecutorRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    let json_logs = env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false);
    if let Err(e) = logging::init_logger(json_logs) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // Initialize metrics
    metrics::init_metrics();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let registry = ExecutorRegistry::with_defaults();

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                signal.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    if let Err(e) = api::start_server(config, &registry, shutdown).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
