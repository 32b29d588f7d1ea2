use std::path::PathBuf;

use emission_zk_types_base::InputKind;

use crate::Stage;

/// Errors encountered by the proof service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A proof was requested before the circuit finished compiling.
    #[error("Circuit not prepared yet. Please try again later.")]
    NotReady,
    /// A collaborator failed while running a pipeline stage.
    #[error("Error {stage}: {src}")]
    Stage { stage: Stage, src: String },
    /// The circuit input carries more items than the circuit allocated.
    #[error("Error building circuit input: {len} {kind} exceed the circuit allocation of {max}")]
    AllocationExceeded {
        kind: InputKind,
        len: usize,
        max: usize,
    },
    /// The submission was cancelled, the named stage never started.
    #[error("submission cancelled before {stage}")]
    Cancelled { stage: Stage },
    /// The submission ran out of time, either while the named stage ran or right before it.
    #[error("submission deadline exceeded {} {}", while_or_before(.started), .stage)]
    DeadlineExceeded { stage: Stage, started: bool },
    /// Covers errors encountered while loading the service configuration.
    #[error("failed to read or deserialize {path}: {src}")]
    Config { path: PathBuf, src: String },
    /// Error while reading or writing a file.
    #[error("io error on {path}: {source}")]
    IoReadWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Error while (de)serializing JSON on disk.
    #[error("json error on {path}: {source}")]
    JsonReadWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A background task panicked or was aborted.
    #[error("background task failed: {0}")]
    Join(String),
}

impl Error {
    /// The pipeline stage the error originates from, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. }
            | Self::Cancelled { stage }
            | Self::DeadlineExceeded { stage, .. } => Some(*stage),
            Self::AllocationExceeded { .. } => Some(Stage::BuildInput),
            _ => None,
        }
    }
}

fn while_or_before(started: &bool) -> &'static str {
    if *started { "while" } else { "before" }
}
