//! HTTP front of the [`ProofService`][emission_zk_prover::ProofService].

pub mod http;
pub use http::{handle, serve, status_for};

mod logger;
pub use logger::setup_logger;

pub mod wiring;
pub use wiring::{Wiring, build_service};
