pub mod allocation;
pub use allocation::{Allocation, InputKind};

pub mod input;
pub use input::{CircuitInput, Receipt, StorageSlot, Transaction};

pub mod proof;
pub use proof::{Proof, PublicOutput, Witness};

pub mod utils;

pub use alloy_primitives::{Address, B256, U256, Uint};

/// Width of the unsigned integers the circuit frontend operates on.
pub const UINT248_BITS: usize = 248;

/// 248-bit unsigned integer, the widest value that fits in a single BN254 scalar.
pub type U248 = Uint<248, 4>;
