//! In-process stand-ins for the proving backend, the chain RPC and the proof network.

use std::sync::{Arc, Mutex, PoisonError};

mod backend;
pub use backend::NativeBackend;

mod chain;
pub use chain::StaticChainClient;

mod network;
pub use network::MockProofNetwork;

/// Names of the collaborator calls, as recorded in a [`CallLog`].
pub mod call {
    pub const COMPILE: &str = "compile";
    pub const BUILD_INPUT: &str = "build_input";
    pub const BUILD_WITNESS: &str = "build_witness";
    pub const PROVE: &str = "prove";
    pub const SUBMIT_PROOF: &str = "submit_proof";
    pub const PREPARE_REQUEST: &str = "prepare_request";
    pub const WAIT_FINALITY: &str = "wait_finality";
}

/// Shared, ordered record of collaborator calls.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn record(&self, call: &'static str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
