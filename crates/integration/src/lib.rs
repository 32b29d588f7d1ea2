use std::{sync::Arc, time::Duration};

use emission_zk_prover::{ProofService, ServiceConfig};
use emission_zk_types_base::StorageSlot;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

pub mod testers;
pub use testers::{CallLog, MockProofNetwork, NativeBackend, StaticChainClient};

/// Guards the global subscriber, tests in the same binary share it.
static LOGGER: OnceCell<()> = OnceCell::new();

/// Install the tracing subscriber, once per process.
pub fn setup_logger() -> eyre::Result<()> {
    LOGGER.get_or_try_init(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_span_events(FmtSpan::CLOSE);

        #[cfg(feature = "limit-logs")]
        {
            let filters = tracing_subscriber::filter::Targets::new()
                .with_target("emission_zk_prover", tracing::Level::INFO)
                .with_target("emission_zk_integration", tracing::Level::DEBUG);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(filters)
                .try_init()?;
        }

        #[cfg(not(feature = "limit-logs"))]
        {
            tracing_subscriber::registry()
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .with(fmt_layer)
                .with(metrics_tracing_context::MetricsLayer::new())
                .try_init()?;
        }

        Ok::<_, eyre::Report>(())
    })?;

    Ok(())
}

/// A [`ProofService`] wired to in-process collaborators, with handles to inspect them.
pub struct DevService {
    pub service: ProofService,
    pub backend: Arc<NativeBackend>,
    pub chain: Arc<StaticChainClient>,
    pub network: Arc<MockProofNetwork>,
    /// Every collaborator call, in the order they happened.
    pub calls: CallLog,
}

/// Builder for a [`DevService`].
#[derive(Clone, Debug)]
pub struct DevServiceBuilder {
    config: ServiceConfig,
    slots: Vec<StorageSlot>,
    compile_delay: Duration,
    compile_failures: usize,
    finality_delay: Duration,
    fee: u128,
}

impl Default for DevServiceBuilder {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl DevServiceBuilder {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            compile_delay: Duration::ZERO,
            compile_failures: 0,
            finality_delay: Duration::ZERO,
            fee: 1_000_000_000_000_000,
        }
    }

    /// Storage slots holding the given values.
    pub fn slot_values(mut self, values: &[u64]) -> Self {
        self.slots = values.iter().map(|v| StorageSlot::with_value(*v)).collect();
        self
    }

    pub fn storage_slots(mut self, slots: Vec<StorageSlot>) -> Self {
        self.slots = slots;
        self
    }

    pub fn compile_delay(mut self, delay: Duration) -> Self {
        self.compile_delay = delay;
        self
    }

    /// Fail the first `failures` compilations.
    pub fn compile_failures(mut self, failures: usize) -> Self {
        self.compile_failures = failures;
        self
    }

    pub fn finality_delay(mut self, delay: Duration) -> Self {
        self.finality_delay = delay;
        self
    }

    pub fn fee(mut self, fee: u128) -> Self {
        self.fee = fee;
        self
    }

    pub fn build(self) -> DevService {
        let calls = CallLog::default();
        let backend = Arc::new(
            NativeBackend::new(calls.clone())
                .with_compile_delay(self.compile_delay)
                .with_compile_failures(self.compile_failures),
        );
        let chain = Arc::new(StaticChainClient::new(calls.clone(), self.slots));
        let network = Arc::new(
            MockProofNetwork::new(calls.clone(), self.fee).with_finality_delay(self.finality_delay),
        );
        let service = ProofService::new(
            self.config,
            backend.clone(),
            chain.clone(),
            network.clone(),
        );

        DevService {
            service,
            backend,
            chain,
            network,
            calls,
        }
    }
}
