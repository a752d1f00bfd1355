use anyhow::Context;

use classify_relay::config::RelayConfig;
use classify_relay::pipeline::BatchCoordinator;
use classify_relay::relay;

/// Reads one queue event from stdin, processes it, and writes the partial
/// batch response to stdout. Logs go to stderr.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::from_env().context("Failed to load configuration")?;

    // RUST_LOG wins over LOG_LEVEL when set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.classifier.endpoint_url,
        labels = ?config.labels,
        min_score = config.min_score,
        notifier = config.notify.backend(),
        "Classification relay starting"
    );

    let coordinator =
        BatchCoordinator::from_config(&config).context("Failed to initialize clients")?;

    let mut stdout = std::io::stdout();
    relay::run(&coordinator, tokio::io::stdin(), &mut stdout).await?;
    Ok(())
}
