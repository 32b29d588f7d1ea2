//! Frontend for application circuits.
//!
//! An [`AppCircuit`] declares how many inputs of each kind it consumes and defines its constraints
//! against a [`CircuitApi`]. Synthesizing a circuit over a concrete [`CircuitInput`] yields an
//! [`Assignment`]: the public outputs and every constraint that the input fails to satisfy.

pub mod api;
pub use api::{Assignment, CircuitApi, Violation};

pub mod stream;
pub use stream::DataStream;

use emission_zk_types_base::{Allocation, CircuitInput, InputKind};

/// Errors raised while defining a circuit.
///
/// Unsatisfied constraints are not errors, they are recorded as [`Violation`]s.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// The input carries more items of some kind than the circuit allocated.
    #[error("{len} {kind} exceed the circuit allocation of {max}")]
    AllocationExceeded {
        kind: InputKind,
        len: usize,
        max: usize,
    },
    /// A public output was declared wider than the frontend supports.
    #[error("public output of {bits} bits is not supported")]
    UnsupportedOutputWidth { bits: usize },
}

/// Circuit defines the behaviour every application circuit implements.
pub trait AppCircuit: Send + Sync {
    /// Short name used in logs and artifact paths.
    fn name(&self) -> &'static str;

    /// Maximum number of receipts, storage slots and transactions the circuit consumes.
    fn allocate(&self) -> Allocation;

    /// Define the constraints and public outputs of the circuit over the given input.
    fn define(&self, api: &mut CircuitApi, input: &CircuitInput) -> Result<(), CircuitError>;
}

/// Check `input` against the circuit's allocation, then run its definition.
pub fn synthesize(
    circuit: &dyn AppCircuit,
    input: &CircuitInput,
) -> Result<Assignment, CircuitError> {
    let allocation = circuit.allocate();
    input
        .fits(&allocation)
        .map_err(|(kind, len)| CircuitError::AllocationExceeded {
            kind,
            len,
            max: allocation.max(kind),
        })?;

    let mut api = CircuitApi::default();
    circuit.define(&mut api, input)?;
    Ok(api.finish())
}
