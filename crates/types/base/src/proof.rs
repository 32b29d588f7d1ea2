use alloy_primitives::{B256, U256};

use crate::{CircuitInput, utils::base64};

/// A value the circuit declares public, together with its declared bit width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct PublicOutput {
    pub bits: usize,
    pub value: U256,
}

/// Full assignment of a circuit's inputs and wires, as produced by the proving backend.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Witness {
    /// The input the witness was generated for.
    pub input: CircuitInput,
    /// Public outputs in declaration order.
    pub public_outputs: Vec<PublicOutput>,
    /// Backend-specific encoding of the assignment.
    #[serde(with = "base64")]
    pub assignment: Vec<u8>,
}

/// A succinct proof over a [`Witness`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Proof {
    /// Digest of the verifying key the proof was generated against.
    pub vk_digest: B256,
    /// Public outputs the proof attests to.
    pub public_outputs: Vec<PublicOutput>,
    #[serde(with = "base64")]
    pub bytes: Vec<u8>,
}
