use std::path::{Path, PathBuf};

use alloy_primitives::B256;
use emission_zk_types_base::{Proof, PublicOutput};
use serde::{Deserialize, Serialize};

use crate::{Error, PreparedRequest};

/// Everything known about a finalized request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Name of the circuit the proof is for.
    pub circuit: String,
    pub request_id: B256,
    pub fee: u128,
    /// Transaction registering the request.
    pub request_tx: B256,
    /// Transaction finalizing the request.
    pub transaction: B256,
    pub proof: Proof,
}

impl SubmissionRecord {
    pub fn new(circuit: &str, request: PreparedRequest, transaction: B256, proof: Proof) -> Self {
        Self {
            circuit: circuit.to_string(),
            request_id: request.request_id,
            fee: request.fee,
            request_tx: request.tx,
            transaction,
            proof,
        }
    }

    /// Public outputs attested by the submitted proof.
    pub fn public_outputs(&self) -> &[PublicOutput] {
        &self.proof.public_outputs
    }

    /// File name of the record under the output directory.
    pub fn file_name(&self) -> String {
        format!("{}-request-{:x}.json", self.circuit, self.request_id)
    }

    /// Read and deserialize the record.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        crate::utils::read_json(path)
    }

    /// Serialize the record and dump it under `dir`, returning the path written.
    pub fn dump<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, Error> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| Error::IoReadWrite {
            source,
            path: dir.into(),
        })?;
        let path = dir.join(self.file_name());
        crate::utils::write_json(&path, self)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    fn record() -> SubmissionRecord {
        SubmissionRecord::new(
            "emission",
            PreparedRequest {
                request_id: B256::repeat_byte(0x11),
                fee: 42,
                tx: B256::repeat_byte(0x22),
            },
            B256::repeat_byte(0x33),
            Proof {
                vk_digest: B256::repeat_byte(0x44),
                public_outputs: vec![PublicOutput {
                    bits: 248,
                    value: U256::from(30000u64),
                }],
                bytes: vec![1, 2, 3],
            },
        )
    }

    #[test]
    fn dump_and_read_back() -> eyre::Result<()> {
        let dir = std::env::temp_dir().join(format!("emission-record-{}", std::process::id()));
        let record = record();

        let path = record.dump(&dir)?;
        assert_eq!(
            path.file_name().and_then(|f| f.to_str()),
            Some(format!("emission-request-{}.json", "11".repeat(32)).as_str())
        );
        assert_eq!(SubmissionRecord::from_json(&path)?, record);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
