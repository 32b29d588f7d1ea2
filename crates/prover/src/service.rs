use std::sync::Arc;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    ChainClient, Error, PreparationGate, PreparationHandle, ProofNetwork, ProofPipeline,
    ProvingBackend, ServiceConfig, Stage, SubmissionContext, SubmissionRecord,
};

/// Acknowledgement returned by the preparation trigger, whatever the eventual outcome.
pub const PREPARATION_STARTED: &str = "Circuit preparation started.";

/// Body of a successful proof submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitProofResponse {
    pub request_id: B256,
    pub fee: u128,
    /// Transaction finalizing the request.
    pub transaction: B256,
}

impl From<&SubmissionRecord> for SubmitProofResponse {
    fn from(record: &SubmissionRecord) -> Self {
        Self {
            request_id: record.request_id,
            fee: record.fee,
            transaction: record.transaction,
        }
    }
}

/// The two operations exposed to callers: preparing the circuit and submitting a proof.
pub struct ProofService {
    config: Arc<ServiceConfig>,
    gate: Arc<PreparationGate>,
    pipeline: Arc<ProofPipeline>,
}

impl ProofService {
    pub fn new(
        config: ServiceConfig,
        backend: Arc<dyn ProvingBackend>,
        chain: Arc<dyn ChainClient>,
        network: Arc<dyn ProofNetwork>,
    ) -> Self {
        let config = Arc::new(config);
        let gate = PreparationGate::new(Arc::clone(&backend), Arc::clone(&config));
        let pipeline = ProofPipeline::new(backend, chain, network, Arc::clone(&config));
        Self {
            config,
            gate: Arc::new(gate),
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn gate(&self) -> &Arc<PreparationGate> {
        &self.gate
    }

    /// Trigger the circuit compilation in the background.
    ///
    /// Returns at once. Callers that only need the acknowledgement may drop the handle.
    pub fn prepare_download(&self) -> PreparationHandle {
        self.gate.trigger()
    }

    /// Run the whole submission pipeline for a freshly built circuit.
    ///
    /// Fails with [`Error::NotReady`] without calling any collaborator if the circuit is not
    /// compiled. Dropping the returned future cancels the submission at its next stage boundary.
    #[instrument("ProofService::submit_proof", skip_all)]
    pub async fn submit_proof(&self) -> Result<SubmitProofResponse, Error> {
        let compiled = self.gate.compiled().await.ok_or(Error::NotReady)?;
        tracing::debug!(vk = %compiled.vk_digest, "circuit ready");

        let ctx = SubmissionContext::new(self.config.submission_timeout());
        let _cancel_on_drop = ctx.cancel_on_drop();

        let pipeline = Arc::clone(&self.pipeline);
        let circuit = self.config.circuit();
        let task_ctx = ctx.clone();
        let span = tracing::Span::current();
        let task = tokio::task::spawn_blocking(move || {
            span.in_scope(|| pipeline.run(&circuit, &task_ctx))
        });

        let joined = match ctx.remaining() {
            Some(remaining) => match tokio::time::timeout(remaining, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    ctx.cancel();
                    let started = ctx.stage();
                    let stage = started.unwrap_or(Stage::BuildInput);
                    tracing::warn!(%stage, "submission deadline exceeded");
                    return Err(Error::DeadlineExceeded {
                        stage,
                        started: started.is_some(),
                    });
                }
            },
            None => task.await,
        };
        let record = joined.map_err(|e| Error::Join(e.to_string()))??;

        if self.config.dump_records {
            match record.dump(&self.config.dirs.output) {
                Ok(path) => tracing::info!(?path, "submission record written"),
                Err(e) => tracing::warn!(error = %e, "failed to write submission record"),
            }
        }

        Ok(SubmitProofResponse::from(&record))
    }
}
