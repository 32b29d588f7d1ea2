use std::sync::{Mutex, PoisonError};

use emission_zk_prover::{ChainClient, ChainContext, CollaboratorResult};
use emission_zk_types_base::{CircuitInput, StorageSlot};
use emission_zk_types_circuit::AppCircuit;

use super::{CallLog, call};

/// Serves a fixed set of storage slots, or a fixed error, instead of querying an RPC node.
#[derive(Debug)]
pub struct StaticChainClient {
    calls: CallLog,
    response: Mutex<Result<Vec<StorageSlot>, String>>,
}

impl StaticChainClient {
    pub fn new(calls: CallLog, slots: Vec<StorageSlot>) -> Self {
        Self {
            calls,
            response: Mutex::new(Ok(slots)),
        }
    }

    /// Fail every following query with `msg`.
    pub fn set_error(&self, msg: impl Into<String>) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = Err(msg.into());
    }
}

impl ChainClient for StaticChainClient {
    fn build_input(
        &self,
        circuit: &dyn AppCircuit,
        chain: &ChainContext,
    ) -> CollaboratorResult<CircuitInput> {
        self.calls.record(call::BUILD_INPUT);
        tracing::debug!(circuit = circuit.name(), chain_id = chain.chain_id, rpc = %chain.rpc_url, "serving static chain state");

        let slots = self
            .response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        Ok(CircuitInput::from_storage_slots(slots))
    }
}
