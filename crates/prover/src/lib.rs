mod error;
pub use error::Error;

pub mod collaborator;
pub use collaborator::{
    ChainClient, CollaboratorError, CollaboratorResult, CompiledCircuit, PreparedRequest,
    ProofNetwork, ProvingBackend,
};

pub mod config;
pub use config::{ChainContext, DirConfig, RequestParams, ServiceConfig, read_service_config};

mod context;
pub use context::{CancelOnDrop, SubmissionContext};

mod gate;
pub use gate::{PreparationGate, PreparationHandle, PreparationOutcome, PreparationState};

mod pipeline;
pub use pipeline::{ProofPipeline, Stage};

pub mod proof;
pub use proof::SubmissionRecord;

mod service;
pub use service::{PREPARATION_STARTED, ProofService, SubmitProofResponse};

pub mod utils;
