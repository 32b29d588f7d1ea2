use tracing_subscriber::{
    EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Directive used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "info";

/// Install the process-wide subscriber: `RUST_LOG` filtering, span close events on stdout and
/// span fields as metric labels.
pub fn setup_logger() -> eyre::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE))
        .with(metrics_tracing_context::MetricsLayer::new())
        .try_init()?;

    Ok(())
}
