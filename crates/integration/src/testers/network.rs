use std::{
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use alloy_primitives::B256;
use emission_zk_prover::{
    CollaboratorResult, PreparedRequest, ProofNetwork, RequestParams, SubmissionContext,
};
use emission_zk_types_base::{Proof, Witness, utils::keccak256};

use super::{CallLog, call};

/// Interval between two finality checks.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Accepts every proof and finalizes every request after a fixed delay.
#[derive(Debug)]
pub struct MockProofNetwork {
    calls: CallLog,
    fee: u128,
    finality_delay: Duration,
    nonce: AtomicU64,
    /// Finality waits abandoned because the submission stopped.
    stopped: AtomicUsize,
    submitted: Mutex<Vec<Proof>>,
    /// Collaborator call to fail, and the message to fail it with.
    failure: Mutex<Option<(&'static str, String)>>,
}

impl MockProofNetwork {
    pub fn new(calls: CallLog, fee: u128) -> Self {
        Self {
            calls,
            fee,
            finality_delay: Duration::ZERO,
            nonce: AtomicU64::new(0),
            stopped: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn with_finality_delay(mut self, delay: Duration) -> Self {
        self.finality_delay = delay;
        self
    }

    /// Make every following `call` (one of the [`call`] names) fail with `msg`.
    pub fn fail(&self, call: &'static str, msg: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some((call, msg.into()));
    }

    /// Proofs accepted so far.
    pub fn submitted(&self) -> Vec<Proof> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of finality waits that gave up because the submission was cancelled or timed out.
    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    fn record(&self, call: &'static str) -> CollaboratorResult<()> {
        self.calls.record(call);
        match &*self.failure.lock().unwrap_or_else(PoisonError::into_inner) {
            Some((failing, msg)) if *failing == call => Err(msg.clone().into()),
            _ => Ok(()),
        }
    }

    fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }
}

impl ProofNetwork for MockProofNetwork {
    fn submit_proof(&self, proof: &Proof) -> CollaboratorResult<()> {
        self.record(call::SUBMIT_PROOF)?;
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(proof.clone());
        Ok(())
    }

    fn prepare_request(
        &self,
        witness: &Witness,
        params: &RequestParams,
    ) -> CollaboratorResult<PreparedRequest> {
        self.record(call::PREPARE_REQUEST)?;

        let mut preimage = witness.assignment.clone();
        preimage.extend_from_slice(&self.next_nonce().to_be_bytes());
        preimage.extend_from_slice(&params.src_chain_id.to_be_bytes());
        preimage.extend_from_slice(&params.dst_chain_id.to_be_bytes());
        preimage.extend_from_slice(params.refund_address.as_slice());
        let request_id = keccak256(&preimage);

        Ok(PreparedRequest {
            request_id,
            fee: self.fee,
            tx: keccak256(request_id),
        })
    }

    fn wait_finality(&self, ctx: &SubmissionContext) -> CollaboratorResult<B256> {
        self.record(call::WAIT_FINALITY)?;

        let start = Instant::now();
        while start.elapsed() < self.finality_delay {
            if ctx.should_stop() {
                self.stopped.fetch_add(1, Ordering::SeqCst);
                return Err("stopped waiting for finality".into());
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        Ok(keccak256(self.next_nonce().to_be_bytes()))
    }
}
