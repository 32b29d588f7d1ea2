use std::{
    path::Path,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy_primitives::B256;
use emission_zk_prover::{ChainContext, CollaboratorResult, CompiledCircuit, ProvingBackend};
use emission_zk_types_base::{CircuitInput, Proof, Witness, utils::keccak256};
use emission_zk_types_circuit::{AppCircuit, synthesize};
use itertools::Itertools;

use super::{CallLog, call};

/// Evaluates circuits natively and derives proof bytes by hashing.
///
/// Produces no real cryptographic proof, but enforces the same contract as a proving backend:
/// keys must be compiled before proving and an unsatisfied circuit yields no witness.
#[derive(Debug)]
pub struct NativeBackend {
    calls: CallLog,
    compile_delay: Duration,
    /// Compilations left to fail before one succeeds.
    compile_failures: AtomicUsize,
    compiles: AtomicUsize,
    vk_digest: Mutex<Option<B256>>,
}

impl NativeBackend {
    pub fn new(calls: CallLog) -> Self {
        Self {
            calls,
            compile_delay: Duration::ZERO,
            compile_failures: AtomicUsize::new(0),
            compiles: AtomicUsize::new(0),
            vk_digest: Mutex::new(None),
        }
    }

    pub fn with_compile_delay(mut self, delay: Duration) -> Self {
        self.compile_delay = delay;
        self
    }

    pub fn with_compile_failures(self, failures: usize) -> Self {
        self.compile_failures.store(failures, Ordering::SeqCst);
        self
    }

    /// Number of compilations attempted, failed ones included.
    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    fn vk_digest(&self) -> Option<B256> {
        *self.vk_digest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProvingBackend for NativeBackend {
    fn compile(
        &self,
        circuit: &dyn AppCircuit,
        out_dir: &Path,
        srs_dir: &Path,
        chain: &ChainContext,
    ) -> CollaboratorResult<CompiledCircuit> {
        self.calls.record(call::COMPILE);
        self.compiles.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.compile_delay);

        if self
            .compile_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(format!("failed to download srs into {}", srs_dir.display()).into());
        }

        let allocation = circuit.allocate();
        let vk_digest = keccak256(
            format!(
                "{}:{}:{}:{}:{}",
                circuit.name(),
                allocation.max_receipts,
                allocation.max_storage_slots,
                allocation.max_transactions,
                chain.chain_id,
            )
            .as_bytes(),
        );
        *self.vk_digest.lock().unwrap_or_else(PoisonError::into_inner) = Some(vk_digest);
        tracing::debug!(circuit = circuit.name(), %vk_digest, "native keys generated");

        Ok(CompiledCircuit {
            circuit: circuit.name().to_string(),
            vk_digest,
            out_dir: out_dir.to_path_buf(),
            srs_dir: srs_dir.to_path_buf(),
        })
    }

    fn build_witness(
        &self,
        circuit: &dyn AppCircuit,
        input: &CircuitInput,
    ) -> CollaboratorResult<Witness> {
        self.calls.record(call::BUILD_WITNESS);

        let assignment = synthesize(circuit, input)?;
        if !assignment.is_satisfied() {
            return Err(format!(
                "circuit unsatisfiable: {}",
                assignment.violations.iter().join(", ")
            )
            .into());
        }

        Ok(Witness {
            input: input.clone(),
            public_outputs: assignment.public_outputs,
            assignment: serde_json::to_vec(input)?,
        })
    }

    fn prove(&self, witness: &Witness) -> CollaboratorResult<Proof> {
        self.calls.record(call::PROVE);

        let vk_digest = self
            .vk_digest()
            .ok_or("proving key not found, compile the circuit first")?;

        let mut preimage = vk_digest.to_vec();
        preimage.extend_from_slice(&witness.assignment);
        for output in &witness.public_outputs {
            preimage.extend_from_slice(&output.value.to_be_bytes::<32>());
        }

        Ok(Proof {
            vk_digest,
            public_outputs: witness.public_outputs.clone(),
            bytes: keccak256(&preimage).to_vec(),
        })
    }
}
