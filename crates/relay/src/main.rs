//! Relay entry point: frames on stdin, published frames on stdout.

use relay::{Config, Relay};
use saga::DeliveryLedger;
use tokio::io::BufReader;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Logs go to stderr; stdout carries the frame stream.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text = (!config.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Expose Prometheus metrics when a listener address is configured
    if let Some(addr) = config.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .expect("failed to install Prometheus exporter");
        tracing::info!(%addr, "serving Prometheus metrics");
    }

    // 3. Build the routing topology
    let topology = config
        .topology()
        .and_then(|topology| topology.build())
        .expect("invalid saga topology");
    tracing::info!(
        participants = topology.participants().len(),
        rules = topology.table().len(),
        "saga topology loaded"
    );

    // 4. Relay stdin to stdout until EOF or a shutdown signal
    let mut relay =
        Relay::new(topology).with_ledger(DeliveryLedger::with_capacity(config.ledger_capacity));
    let stats = relay
        .run(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown_signal(),
        )
        .await
        .expect("relay I/O error");

    tracing::info!(
        frames = stats.frames,
        routed = stats.routed,
        duplicates = stats.duplicates,
        rejected = stats.rejected,
        alerts = stats.alerts,
        "relay shut down gracefully"
    );
}
