use std::sync::Arc;

use metrics::counter;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{Instrument, instrument};

use crate::{CompiledCircuit, Error, ProvingBackend, ServiceConfig};

/// Lifecycle of the circuit compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreparationState {
    NotPrepared,
    /// A compilation is in flight. Only observable after a compilation panicked, since the
    /// lock is held for the whole compilation.
    Preparing,
    /// Terminal: the circuit is compiled for the rest of the process lifetime.
    Prepared(Arc<CompiledCircuit>),
}

/// What a single preparation attempt did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreparationOutcome {
    /// This attempt compiled the circuit.
    Compiled(Arc<CompiledCircuit>),
    /// An earlier attempt already compiled the circuit, nothing was done.
    AlreadyPrepared(Arc<CompiledCircuit>),
    /// Compilation failed, a later trigger will try again.
    Failed(String),
}

impl PreparationOutcome {
    pub fn compiled(&self) -> Option<&Arc<CompiledCircuit>> {
        match self {
            Self::Compiled(compiled) | Self::AlreadyPrepared(compiled) => Some(compiled),
            Self::Failed(_) => None,
        }
    }
}

/// Completion signal of a background preparation.
///
/// Dropping the handle detaches the task, the preparation still runs to completion.
#[derive(Debug)]
pub struct PreparationHandle {
    task: JoinHandle<PreparationOutcome>,
}

impl PreparationHandle {
    /// Wait for the preparation attempt to finish.
    pub async fn wait(self) -> Result<PreparationOutcome, Error> {
        self.task.await.map_err(|e| Error::Join(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Runs the circuit compilation at most once per gate.
///
/// The state lives behind a single lock that is held for the whole compilation: concurrent
/// triggers queue behind an in-flight compilation and then observe its result. Readiness is only
/// ever read under the same lock.
pub struct PreparationGate {
    state: Arc<Mutex<PreparationState>>,
    backend: Arc<dyn ProvingBackend>,
    config: Arc<ServiceConfig>,
}

impl PreparationGate {
    pub fn new(backend: Arc<dyn ProvingBackend>, config: Arc<ServiceConfig>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PreparationState::NotPrepared)),
            backend,
            config,
        }
    }

    /// Start preparing in the background and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(self: &Arc<Self>) -> PreparationHandle {
        let gate = Arc::clone(self);
        let span = tracing::info_span!("PreparationGate::trigger");
        PreparationHandle {
            task: tokio::spawn(async move { gate.prepare().await }.instrument(span)),
        }
    }

    /// Compile the circuit unless it is already compiled.
    ///
    /// The compilation owns the lock until it settles the state, even if this future is dropped
    /// halfway. Failures are logged and reported in the outcome, the state falls back to
    /// [`PreparationState::NotPrepared`].
    #[instrument("PreparationGate::prepare", skip_all)]
    pub async fn prepare(&self) -> PreparationOutcome {
        let mut state = Arc::clone(&self.state).lock_owned().await;

        match &*state {
            PreparationState::Prepared(compiled) => {
                tracing::info!("Circuit already prepared.");
                return PreparationOutcome::AlreadyPrepared(Arc::clone(compiled));
            }
            PreparationState::Preparing => {
                tracing::warn!("previous compilation panicked, retrying");
            }
            PreparationState::NotPrepared => {}
        }
        *state = PreparationState::Preparing;
        counter!("emission_prover_compile_attempts_total").increment(1);

        let circuit = self.config.circuit();
        let backend = Arc::clone(&self.backend);
        let config = Arc::clone(&self.config);
        let span = tracing::Span::current();
        let task = tokio::task::spawn_blocking(move || {
            span.in_scope(|| {
                let compiled =
                    backend.compile(&circuit, &config.dirs.circuit, &config.dirs.srs, &config.chain);
                match compiled {
                    Ok(compiled) => {
                        let compiled = Arc::new(compiled);
                        tracing::info!(vk = %compiled.vk_digest, out_dir = ?compiled.out_dir, "Circuit preparation complete.");
                        *state = PreparationState::Prepared(Arc::clone(&compiled));
                        PreparationOutcome::Compiled(compiled)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Error compiling circuit");
                        *state = PreparationState::NotPrepared;
                        PreparationOutcome::Failed(e.to_string())
                    }
                }
            })
        });

        task.await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "compilation task did not complete");
            PreparationOutcome::Failed(e.to_string())
        })
    }

    /// Snapshot of the current state. Waits for an in-flight compilation to finish.
    pub async fn state(&self) -> PreparationState {
        self.state.lock().await.clone()
    }

    /// Compiled artifacts, if the circuit is prepared.
    pub async fn compiled(&self) -> Option<Arc<CompiledCircuit>> {
        match &*self.state.lock().await {
            PreparationState::Prepared(compiled) => Some(Arc::clone(compiled)),
            _ => None,
        }
    }
}
