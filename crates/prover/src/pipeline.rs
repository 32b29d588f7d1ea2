use std::{fmt, sync::Arc};

use emission_zk_types_circuit::AppCircuit;
use metrics::counter;
use tracing::instrument;

use crate::{
    ChainClient, CollaboratorError, Error, ProofNetwork, ProvingBackend, ServiceConfig,
    SubmissionContext, SubmissionRecord,
};

/// The stages of a proof submission, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    BuildInput,
    GenerateWitness,
    GenerateProof,
    SubmitProof,
    PrepareRequest,
    WaitFinality,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::BuildInput,
        Stage::GenerateWitness,
        Stage::GenerateProof,
        Stage::SubmitProof,
        Stage::PrepareRequest,
        Stage::WaitFinality,
    ];

    /// Position of the stage in [`Stage::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used as a metrics label.
    pub fn name(self) -> &'static str {
        match self {
            Stage::BuildInput => "build_input",
            Stage::GenerateWitness => "generate_witness",
            Stage::GenerateProof => "generate_proof",
            Stage::SubmitProof => "submit_proof",
            Stage::PrepareRequest => "prepare_request",
            Stage::WaitFinality => "wait_finality",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activity = match self {
            Stage::BuildInput => "building circuit input",
            Stage::GenerateWitness => "generating witness",
            Stage::GenerateProof => "generating proof",
            Stage::SubmitProof => "submitting proof",
            Stage::PrepareRequest => "preparing request",
            Stage::WaitFinality => "waiting for proof submission",
        };
        f.write_str(activity)
    }
}

/// Wrap a collaborator failure with the stage it happened in.
fn failed(stage: Stage) -> impl FnOnce(CollaboratorError) -> Error {
    move |e| {
        counter!("emission_prover_stage_failures_total", "stage" => stage.name()).increment(1);
        tracing::warn!(stage = stage.name(), error = %e, "pipeline stage failed");
        Error::Stage {
            stage,
            src: e.to_string(),
        }
    }
}

/// Sequential proof submission: from chain state to a finalized request.
///
/// Every stage consumes the output of the previous one. The first failure aborts the run, nothing
/// is retried and nothing is rolled back: once [`Stage::SubmitProof`] succeeded the proof stays
/// submitted even if a later stage fails.
///
/// Runs share no state, concurrent submissions each rebuild their input and witness and call the
/// collaborators independently.
pub struct ProofPipeline {
    backend: Arc<dyn ProvingBackend>,
    chain: Arc<dyn ChainClient>,
    network: Arc<dyn ProofNetwork>,
    config: Arc<ServiceConfig>,
}

impl ProofPipeline {
    pub fn new(
        backend: Arc<dyn ProvingBackend>,
        chain: Arc<dyn ChainClient>,
        network: Arc<dyn ProofNetwork>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            backend,
            chain,
            network,
            config,
        }
    }

    /// Run every stage for `circuit`. Blocks until the request is final, the context is
    /// cancelled or a stage fails.
    #[instrument("ProofPipeline::run", skip_all, fields(circuit = circuit.name()))]
    pub fn run(
        &self,
        circuit: &dyn AppCircuit,
        ctx: &SubmissionContext,
    ) -> Result<SubmissionRecord, Error> {
        ctx.enter(Stage::BuildInput)?;
        let input = self
            .chain
            .build_input(circuit, &self.config.chain)
            .map_err(failed(Stage::BuildInput))?;
        let allocation = circuit.allocate();
        input
            .fits(&allocation)
            .map_err(|(kind, len)| Error::AllocationExceeded {
                kind,
                len,
                max: allocation.max(kind),
            })?;
        tracing::debug!(storage_slots = input.storage_slots.len(), "circuit input built");

        ctx.enter(Stage::GenerateWitness)?;
        let witness = self
            .backend
            .build_witness(circuit, &input)
            .map_err(failed(Stage::GenerateWitness))?;

        ctx.enter(Stage::GenerateProof)?;
        let proof = self
            .backend
            .prove(&witness)
            .map_err(failed(Stage::GenerateProof))?;
        tracing::info!(vk = %proof.vk_digest, "proof generated");

        ctx.enter(Stage::SubmitProof)?;
        self.network
            .submit_proof(&proof)
            .map_err(failed(Stage::SubmitProof))?;

        ctx.enter(Stage::PrepareRequest)?;
        let request = self
            .network
            .prepare_request(&witness, &self.config.request)
            .map_err(failed(Stage::PrepareRequest))?;
        tracing::info!(request_id = %request.request_id, fee = request.fee, tx = %request.tx, "request prepared");

        ctx.enter(Stage::WaitFinality)?;
        let transaction = self
            .network
            .wait_finality(ctx)
            .map_err(failed(Stage::WaitFinality))?;
        tracing::info!(request_id = %request.request_id, %transaction, "request final");

        Ok(SubmissionRecord::new(circuit.name(), request, transaction, proof))
    }
}
