//! Contracts of the external systems the service drives.
//!
//! None of these are implemented here: the proving backend, the chain RPC client and the proof
//! network are injected into [`ProofService`][crate::ProofService] at construction time. All calls
//! are blocking; the service runs them on the blocking thread pool.

use std::path::{Path, PathBuf};

use alloy_primitives::B256;
use emission_zk_types_base::{CircuitInput, Proof, Witness};
use emission_zk_types_circuit::AppCircuit;
use serde::{Deserialize, Serialize};

use crate::{ChainContext, RequestParams, SubmissionContext};

/// Error reported by a collaborator. Its message is surfaced verbatim to the caller.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Artifacts of a successful circuit compilation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledCircuit {
    /// Name of the compiled circuit.
    pub circuit: String,
    /// Digest of the verifying key, identifies which circuit a proof comes from.
    pub vk_digest: B256,
    /// Directory the proving and verifying keys were written to.
    pub out_dir: PathBuf,
    /// Directory of the structured reference string used for key generation.
    pub srs_dir: PathBuf,
}

/// A cross-chain request registered with the proof network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRequest {
    pub request_id: B256,
    /// Fee charged for the request, in the smallest unit of the fee token.
    pub fee: u128,
    /// Transaction registering the request.
    pub tx: B256,
}

/// Cryptographic backend: key generation, witness generation and proving.
pub trait ProvingBackend: Send + Sync {
    /// Compile `circuit` and generate its keys under `out_dir`, reading the SRS from `srs_dir`.
    ///
    /// Expensive and not idempotent, see [`PreparationGate`][crate::PreparationGate].
    fn compile(
        &self,
        circuit: &dyn AppCircuit,
        out_dir: &Path,
        srs_dir: &Path,
        chain: &ChainContext,
    ) -> CollaboratorResult<CompiledCircuit>;

    /// Run the circuit definition over `input`. Fails if the constraints are not satisfied.
    fn build_witness(
        &self,
        circuit: &dyn AppCircuit,
        input: &CircuitInput,
    ) -> CollaboratorResult<Witness>;

    /// Generate a succinct proof of the witness.
    fn prove(&self, witness: &Witness) -> CollaboratorResult<Proof>;
}

/// Reads circuit inputs from chain state.
pub trait ChainClient: Send + Sync {
    /// Fetch the current values of the data the circuit consumes.
    fn build_input(
        &self,
        circuit: &dyn AppCircuit,
        chain: &ChainContext,
    ) -> CollaboratorResult<CircuitInput>;
}

/// The network that verifies proofs on chain and fulfils requests.
pub trait ProofNetwork: Send + Sync {
    fn submit_proof(&self, proof: &Proof) -> CollaboratorResult<()>;

    /// Register the request the proof fulfils and pay its fee.
    fn prepare_request(
        &self,
        witness: &Witness,
        params: &RequestParams,
    ) -> CollaboratorResult<PreparedRequest>;

    /// Block until the request is final on chain, returning the finalizing transaction.
    ///
    /// Implementations must return once [`SubmissionContext::should_stop`] is true.
    fn wait_finality(&self, ctx: &SubmissionContext) -> CollaboratorResult<B256>;
}
