mod circuit;
pub use circuit::{EmissionCircuit, EMISSION_ALLOCATION};
